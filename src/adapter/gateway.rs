//! Adapter command gateway
//!
//! The only component that invokes the command executor. Translates raw
//! command results into adapter states and classified errors. No retries
//! here; retry policy belongs to the verifier.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::AdapterError;
use crate::{
    services::{parse::parse_status, CommandExecutor, CommandRequest},
    state::{AdapterHandle, AdapterState, TargetState},
};

/// Status query and enable/disable operations against one adapter
#[async_trait]
pub trait AdapterGateway: Send + Sync {
    /// Current state. Errors mean the state is `Unknown`.
    async fn query(&self, handle: &AdapterHandle) -> Result<AdapterState, AdapterError>;

    /// Issue the enable/disable command
    ///
    /// Success only means the command ran; the new state may not be
    /// observable yet.
    async fn set_enabled(
        &self,
        handle: &AdapterHandle,
        target: TargetState,
    ) -> Result<(), AdapterError>;
}

/// Time limits for gateway commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    pub query: Duration,
    /// Longer, since some adapters take a while to settle
    pub command: Duration,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            query: Duration::from_secs(10),
            command: Duration::from_secs(30),
        }
    }
}

/// Gateway backed by an external command executor
pub struct CommandGateway {
    executor: Arc<dyn CommandExecutor>,
    timeouts: GatewayTimeouts,
}

impl CommandGateway {
    pub fn new(executor: Arc<dyn CommandExecutor>, timeouts: GatewayTimeouts) -> Self {
        Self { executor, timeouts }
    }
}

#[async_trait]
impl AdapterGateway for CommandGateway {
    async fn query(&self, handle: &AdapterHandle) -> Result<AdapterState, AdapterError> {
        let query_failed = |reason: String| AdapterError::QueryFailed {
            adapter: handle.name().to_string(),
            reason,
        };

        let request = CommandRequest::Query {
            adapter: handle.name().to_string(),
        };
        let output = self
            .executor
            .execute(&request, self.timeouts.query)
            .await
            .map_err(|e| query_failed(e.to_string()))?;

        if !output.success {
            return Err(query_failed(output.failure_reason()));
        }

        let state = parse_status(&output.stdout).ok_or_else(|| {
            query_failed(format!("unrecognised status output '{}'", output.stdout.trim()))
        })?;
        debug!("'{}' reports {}", handle, state);
        Ok(state)
    }

    async fn set_enabled(
        &self,
        handle: &AdapterHandle,
        target: TargetState,
    ) -> Result<(), AdapterError> {
        let command_failed = |reason: String| AdapterError::CommandFailed {
            adapter: handle.name().to_string(),
            target,
            reason,
        };

        let request = CommandRequest::SetEnabled {
            adapter: handle.name().to_string(),
            enabled: target.is_enabled(),
        };
        let output = self
            .executor
            .execute(&request, self.timeouts.command)
            .await
            .map_err(|e| command_failed(e.to_string()))?;

        if !output.success {
            let reason = output.failure_reason();
            warn!("{} rejected: {}", request.describe(), reason);
            return Err(command_failed(reason));
        }

        info!("{} command executed", request.describe());
        Ok(())
    }
}
