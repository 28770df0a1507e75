//! Status verifier
//!
//! Drivers apply state changes asynchronously, so a command returning does
//! not mean the new state is visible. The verifier polls until it is, with a
//! bounded attempt budget.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use super::AdapterGateway;
use crate::state::{AdapterHandle, AdapterState};

/// Polling policy for verification
///
/// Worst case wait is `max_attempts * interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl VerifyPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    pub const fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// # Panics
    ///
    /// Panics if `max_attempts` is 0.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(max_attempts >= 1, "max_attempts must be at least 1");
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Longest time a verification can take
    pub fn worst_case(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of waiting for a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// Last observed state (`Unknown` if the last query failed)
    pub observed: AdapterState,
    pub matched: bool,
    pub attempts: u32,
}

/// Waits until the adapter reports an expected state
#[async_trait]
pub trait StateVerifier: Send + Sync {
    async fn wait_for_state(
        &self,
        handle: &AdapterHandle,
        expected: AdapterState,
        policy: &VerifyPolicy,
    ) -> Verification;
}

/// Verifier that sleeps then queries the gateway, up to the attempt budget
pub struct PollingVerifier {
    gateway: Arc<dyn AdapterGateway>,
}

impl PollingVerifier {
    pub fn new(gateway: Arc<dyn AdapterGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StateVerifier for PollingVerifier {
    async fn wait_for_state(
        &self,
        handle: &AdapterHandle,
        expected: AdapterState,
        policy: &VerifyPolicy,
    ) -> Verification {
        let mut observed = AdapterState::Unknown;

        for attempt in 1..=policy.max_attempts {
            sleep(policy.interval).await;

            observed = match self.gateway.query(handle).await {
                Ok(state) => state,
                Err(e) => {
                    debug!("Verification query {} failed: {}", attempt, e);
                    AdapterState::Unknown
                }
            };

            if observed == expected {
                debug!("'{}' reached {} after {} checks", handle, expected, attempt);
                return Verification {
                    observed,
                    matched: true,
                    attempts: attempt,
                };
            }
            debug!(
                "Check {}/{}: '{}' is {}, waiting for {}",
                attempt, policy.max_attempts, handle, observed, expected
            );
        }

        Verification {
            observed,
            matched: false,
            attempts: policy.max_attempts,
        }
    }
}
