//! Host command execution for adapter operations

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::executor::{CommandExecutor, CommandOutput, CommandRequest};
use crate::adapter::ExecError;

#[cfg(windows)]
const PROGRAM: &str = "powershell";
#[cfg(not(windows))]
const PROGRAM: &str = "ip";

/// Executes adapter commands with PowerShell on Windows and iproute2 elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Program plus arguments for a request
    pub fn command_line(request: &CommandRequest) -> (&'static str, Vec<String>) {
        (PROGRAM, platform_args(request))
    }
}

#[cfg(windows)]
fn platform_args(request: &CommandRequest) -> Vec<String> {
    let script = match request {
        CommandRequest::Query { adapter } => format!(
            "Get-NetAdapter -Name '{}' | Select-Object -ExpandProperty Status",
            quote(adapter)
        ),
        CommandRequest::SetEnabled { adapter, enabled: true } => {
            format!("Enable-NetAdapter -Name '{}' -Confirm:$false", quote(adapter))
        }
        CommandRequest::SetEnabled { adapter, enabled: false } => {
            format!("Disable-NetAdapter -Name '{}' -Confirm:$false", quote(adapter))
        }
        CommandRequest::List => {
            "Get-NetAdapter | Select-Object Name,InterfaceDescription,Status | ConvertTo-Json"
                .to_string()
        }
    };
    vec!["-NoProfile".to_string(), "-NonInteractive".to_string(), "-Command".to_string(), script]
}

#[cfg(not(windows))]
fn platform_args(request: &CommandRequest) -> Vec<String> {
    let args: Vec<&str> = match request {
        CommandRequest::Query { adapter } => vec!["-o", "link", "show", "dev", adapter.as_str()],
        CommandRequest::SetEnabled { adapter, enabled } => {
            vec!["link", "set", "dev", adapter.as_str(), if *enabled { "up" } else { "down" }]
        }
        CommandRequest::List => vec!["-o", "link", "show"],
    };
    args.into_iter().map(String::from).collect()
}

/// Escape a name for a single-quoted PowerShell string
#[cfg(windows)]
fn quote(name: &str) -> String {
    name.replace('\'', "''")
}

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn execute(
        &self,
        request: &CommandRequest,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecError> {
        let (program, args) = Self::command_line(request);
        debug!("Running {} ({}s limit)", request.describe(), timeout.as_secs());
        run_with_timeout(program, &args, timeout).await
    }
}

/// Run a program to completion, killing it if it outlives `limit`
async fn run_with_timeout(
    program: &str,
    args: &[String],
    limit: Duration,
) -> Result<CommandOutput, ExecError> {
    let child = Command::new(program).args(args).kill_on_drop(true).output();

    let output = tokio::time::timeout(limit, child)
        .await
        .map_err(|_| ExecError::TimedOut {
            program: program.to_string(),
            seconds: limit.as_secs(),
        })?
        .map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Check that the adapter management tool can be launched
pub async fn check_adapter_tool_available() -> Result<(), String> {
    #[cfg(windows)]
    let version_args = ["-NoProfile", "-Command", "$PSVersionTable.PSVersion.Major"];
    #[cfg(not(windows))]
    let version_args = ["-V"];

    match Command::new(PROGRAM).args(version_args).output().await {
        Ok(_) => {
            info!("{} is available", PROGRAM);
            Ok(())
        }
        Err(e) => {
            warn!("{} could not be started: {}", PROGRAM, e);
            Err(format!("{} is not available; adapter operations will fail", PROGRAM))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn iproute_command_lines() {
        let (program, args) = SystemExecutor::command_line(&CommandRequest::SetEnabled {
            adapter: "eth0".to_string(),
            enabled: false,
        });
        assert_eq!(program, "ip");
        assert_eq!(args, ["link", "set", "dev", "eth0", "down"]);

        let (_, args) =
            SystemExecutor::command_line(&CommandRequest::Query { adapter: "eth0".to_string() });
        assert_eq!(args, ["-o", "link", "show", "dev", "eth0"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_is_killed_at_the_limit() {
        let args = vec!["5".to_string()];
        let start = std::time::Instant::now();

        let error = run_with_timeout("sleep", &args, Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(error, ExecError::TimedOut { ref program, .. } if program == "sleep"));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_and_output_are_captured() {
        let args = vec!["-c".to_string(), "echo up; echo denied >&2; exit 3".to_string()];

        let output = run_with_timeout("sh", &args, Duration::from_secs(5)).await.unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "up");
        assert_eq!(output.stderr.trim(), "denied");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let error = run_with_timeout("adapter-toggle-no-such-tool", &[], Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(error, ExecError::Spawn { .. }));
    }

    #[cfg(windows)]
    #[test]
    fn powershell_quotes_adapter_names() {
        let (program, args) = SystemExecutor::command_line(&CommandRequest::SetEnabled {
            adapter: "Bob's NIC".to_string(),
            enabled: true,
        });
        assert_eq!(program, "powershell");
        assert_eq!(args.last().unwrap(), "Enable-NetAdapter -Name 'Bob''s NIC' -Confirm:$false");
    }
}
