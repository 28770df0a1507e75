//! External command executor seam
//!
//! The gateway and the directory are the only callers. The executor knows
//! the OS-level command syntax; callers only see requests and raw output.

use std::time::Duration;

use async_trait::async_trait;

use crate::adapter::ExecError;

/// An OS-level adapter operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    /// Report the status of one adapter
    Query { adapter: String },
    /// Administratively enable or disable one adapter
    SetEnabled { adapter: String, enabled: bool },
    /// List every adapter with its status
    List,
}

impl CommandRequest {
    /// Short name for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Query { adapter } => format!("query '{}'", adapter),
            Self::SetEnabled { adapter, enabled: true } => format!("enable '{}'", adapter),
            Self::SetEnabled { adapter, enabled: false } => format!("disable '{}'", adapter),
            Self::List => "list adapters".to_string(),
        }
    }
}

/// Exit status and captured text of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Best available explanation for a failed command
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs adapter commands against the host
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `request`, giving up after `timeout`
    async fn execute(
        &self,
        request: &CommandRequest,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecError>;
}
