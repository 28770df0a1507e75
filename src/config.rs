//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{adapter::{GatewayTimeouts, VerifyPolicy}, tasks::TimerSettings};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "adapter-toggle")]
#[command(about = "Toggle a network adapter on and off, or disable it for a while")]
#[command(version)]
pub struct Config {
    /// Name or description pattern of the adapter to control
    #[arg(short, long = "adapter", default_value = "Ethernet")]
    pub adapter_pattern: String,

    /// Adapter name to use when nothing matches the pattern
    #[arg(long, default_value = "Ethernet")]
    pub fallback_name: String,

    /// Status query timeout in seconds
    #[arg(long, default_value = "10")]
    pub query_timeout: u64,

    /// Enable/disable command timeout in seconds
    #[arg(long, default_value = "30")]
    pub command_timeout: u64,

    /// Status checks after each command before giving up
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub verify_attempts: u32,

    /// Delay before each status check, in milliseconds
    #[arg(long, default_value = "500")]
    pub verify_interval_ms: u64,

    /// How often a running timer checks for cancellation, in milliseconds
    #[arg(long, default_value = "500", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// How long cancelling waits for the timer to stop, in milliseconds
    #[arg(long, default_value = "1000")]
    pub cancel_wait_ms: u64,

    /// Timed-disable menu entries in seconds
    #[arg(long, value_delimiter = ',', default_value = "60,120,300,1800,3600")]
    pub durations: Vec<u64>,

    /// Only log errors
    #[arg(long, conflicts_with = "verbose")]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.silent {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    pub fn gateway_timeouts(&self) -> GatewayTimeouts {
        GatewayTimeouts {
            query: Duration::from_secs(self.query_timeout),
            command: Duration::from_secs(self.command_timeout),
        }
    }

    pub fn verify_policy(&self) -> VerifyPolicy {
        VerifyPolicy::new()
            .with_max_attempts(self.verify_attempts.max(1))
            .with_interval(Duration::from_millis(self.verify_interval_ms))
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            cancel_wait: Duration::from_millis(self.cancel_wait_ms),
        }
    }

    /// Menu durations with zero entries dropped
    pub fn timer_durations(&self) -> Vec<u64> {
        self.durations.iter().copied().filter(|seconds| *seconds > 0).collect()
    }
}
