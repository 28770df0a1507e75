//! Adapter Toggle - controls the enabled state of a single network adapter
//!
//! This is the main entry point for the adapter-toggle application.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use adapter_toggle::{
    adapter::{CommandGateway, PollingVerifier},
    config::Config,
    controller::Controller,
    host::Host,
    services::{
        check_adapter_tool_available, resolve_adapter, CommandDirectory, SystemExecutor,
    },
    tasks::DelayedActionTimer,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("adapter_toggle={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting adapter-toggle v{}", env!("CARGO_PKG_VERSION"));
    info!("Toggling adapters requires administrator privileges");

    // Keep going without the tool; every operation will report the failure
    if let Err(e) = check_adapter_tool_available().await {
        warn!("{}", e);
    }

    let timeouts = config.gateway_timeouts();
    let executor = Arc::new(SystemExecutor::new());
    let directory = CommandDirectory::new(executor.clone(), timeouts.query);
    let resolved =
        resolve_adapter(&directory, &config.adapter_pattern, &config.fallback_name).await;

    let gateway = Arc::new(CommandGateway::new(executor, timeouts));
    let verifier = Arc::new(PollingVerifier::new(gateway.clone()));
    let controller = Arc::new(Controller::new(
        resolved,
        gateway,
        verifier,
        config.verify_policy(),
    ));
    let timer = Arc::new(DelayedActionTimer::new(
        Arc::clone(&controller),
        config.timer_settings(),
    ));
    let host = Host::new(
        Arc::clone(&controller),
        Arc::clone(&timer),
        config.timer_durations(),
    );

    let input = stdin_lines();
    let output = tokio::io::stdout();

    tokio::select! {
        result = host.run(input, output) => {
            if let Err(e) = result {
                tracing::error!("Host error: {}", e);
            }
        }
        _ = async {
            if let Err(e) = shutdown_signal().await {
                // Without signal handling, quitting from the menu still works
                warn!("Signal handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        } => {
            info!("Shutdown signal received");
            timer.cancel().await;
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Forward stdin from a dedicated thread so a pending read never holds up shutdown
fn stdin_lines() -> impl AsyncBufRead + Unpin {
    let (mut tx, rx) = tokio::io::duplex(4096);
    let runtime = tokio::runtime::Handle::current();

    std::thread::spawn(move || {
        for line in std::io::stdin().lines().map_while(Result::ok) {
            let forwarded = runtime.block_on(async {
                tx.write_all(line.as_bytes()).await?;
                tx.write_all(b"\n").await
            });
            if forwarded.is_err() {
                break;
            }
        }
    });

    BufReader::new(rx)
}
