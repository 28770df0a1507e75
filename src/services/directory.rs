//! Adapter directory: resolves the target adapter once at startup

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{info, warn};

use super::{
    executor::{CommandExecutor, CommandRequest},
    parse::parse_listing,
};
use crate::{
    adapter::AdapterError,
    state::{AdapterHandle, AdapterState, OperationOutcome},
};

/// An adapter found by the directory together with its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredAdapter {
    pub handle: AdapterHandle,
    pub state: AdapterState,
}

/// Looks up adapters on the host
#[async_trait]
pub trait AdapterDirectory: Send + Sync {
    /// First adapter whose name or description contains `pattern`
    async fn find_first_matching(
        &self,
        pattern: &str,
    ) -> Result<Option<DiscoveredAdapter>, AdapterError>;
}

/// Directory backed by the adapter listing command
pub struct CommandDirectory {
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
}

impl CommandDirectory {
    pub fn new(executor: Arc<dyn CommandExecutor>, timeout: Duration) -> Self {
        Self { executor, timeout }
    }
}

#[async_trait]
impl AdapterDirectory for CommandDirectory {
    async fn find_first_matching(
        &self,
        pattern: &str,
    ) -> Result<Option<DiscoveredAdapter>, AdapterError> {
        let query_failed = |reason: String| AdapterError::QueryFailed {
            adapter: pattern.to_string(),
            reason,
        };

        let output = self
            .executor
            .execute(&CommandRequest::List, self.timeout)
            .await
            .map_err(|e| query_failed(e.to_string()))?;

        if !output.success {
            return Err(query_failed(output.failure_reason()));
        }

        Ok(parse_listing(&output.stdout)
            .into_iter()
            .find(|adapter| adapter.matches(pattern))
            .map(|adapter| DiscoveredAdapter {
                handle: AdapterHandle::new(adapter.name),
                state: adapter.state,
            }))
    }
}

/// Adapter the controller starts with
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAdapter {
    pub handle: AdapterHandle,
    pub state: AdapterState,
    pub outcome: OperationOutcome,
}

/// Resolve the target adapter, falling back to `fallback_name` when nothing matches
///
/// Never fails: a missing adapter yields the fallback handle in `Unknown`
/// state so later operations report errors instead of crashing.
pub async fn resolve_adapter(
    directory: &dyn AdapterDirectory,
    pattern: &str,
    fallback_name: &str,
) -> ResolvedAdapter {
    let error = match directory.find_first_matching(pattern).await {
        Ok(Some(found)) => {
            info!("Found adapter '{}' ({})", found.handle, found.state);
            return ResolvedAdapter {
                handle: found.handle,
                state: found.state,
                outcome: OperationOutcome::Detected,
            };
        }
        Ok(None) => AdapterError::AdapterNotFound { pattern: pattern.to_string() },
        Err(e) => {
            warn!("Adapter lookup failed: {}", e);
            AdapterError::AdapterNotFound { pattern: pattern.to_string() }
        }
    };

    warn!("Could not find an adapter matching '{}', using '{}'", pattern, fallback_name);
    ResolvedAdapter {
        handle: AdapterHandle::new(fallback_name),
        state: AdapterState::Unknown,
        outcome: OperationOutcome::Failed(error),
    }
}
