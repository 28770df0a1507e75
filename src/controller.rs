//! Adapter controller: the single owner of the adapter's state
//!
//! Every state-mutating operation funnels through one critical section, so a
//! manual toggle, a timer disable, a timer re-enable and a cancel-then-enable
//! never interleave. The recorded state is always the last observation, never
//! the requested one.
//!
//! Operations run on their own task. A caller that is dropped or aborted while
//! a command is in flight stops waiting, but the command is still verified and
//! recorded before the next operation starts.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::{
    adapter::{AdapterError, AdapterGateway, StateVerifier, VerifyPolicy},
    services::ResolvedAdapter,
    state::{AdapterHandle, AdapterState, ControllerSnapshot, OperationOutcome, TargetState},
};

#[derive(Debug, Clone, Copy)]
enum Operation {
    Set(TargetState),
    Toggle,
    Refresh,
}

pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    handle: AdapterHandle,
    gateway: Arc<dyn AdapterGateway>,
    verifier: Arc<dyn StateVerifier>,
    policy: VerifyPolicy,
    /// Held for the whole of every set/toggle/refresh
    operation: Mutex<()>,
    /// Written only inside `operation`; readers borrow without blocking it
    snapshot_tx: watch::Sender<ControllerSnapshot>,
}

impl Controller {
    pub fn new(
        resolved: ResolvedAdapter,
        gateway: Arc<dyn AdapterGateway>,
        verifier: Arc<dyn StateVerifier>,
        policy: VerifyPolicy,
    ) -> Self {
        let snapshot =
            ControllerSnapshot::new(resolved.handle.clone(), resolved.state, resolved.outcome);
        let (snapshot_tx, _) = watch::channel(snapshot);

        Self {
            inner: Arc::new(ControllerInner {
                handle: resolved.handle,
                gateway,
                verifier,
                policy,
                operation: Mutex::new(()),
                snapshot_tx,
            }),
        }
    }

    pub fn handle(&self) -> &AdapterHandle {
        &self.inner.handle
    }

    /// Last recorded state, without querying the adapter
    pub fn current_state(&self) -> AdapterState {
        self.inner.snapshot_tx.borrow().current_state
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receive every snapshot update, including ones caused by the timer
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Drive the adapter to `target` and record what was actually observed
    ///
    /// Always issues the command, even if the cached state already matches.
    pub async fn set_state(&self, target: TargetState) -> AdapterState {
        self.run(Operation::Set(target)).await
    }

    /// Flip the adapter. An `Unknown` state is toggled as if it were disabled.
    pub async fn toggle(&self) -> AdapterState {
        self.run(Operation::Toggle).await
    }

    /// Re-query the adapter and record the result
    pub async fn refresh(&self) -> AdapterState {
        self.run(Operation::Refresh).await
    }

    async fn run(&self, operation: Operation) -> AdapterState {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.perform(operation).await });

        match task.await {
            Ok(state) => state,
            Err(e) => {
                warn!("{:?} on '{}' ended abnormally: {}", operation, self.inner.handle, e);
                self.current_state()
            }
        }
    }
}

impl ControllerInner {
    async fn perform(&self, operation: Operation) -> AdapterState {
        let _guard = self.operation.lock().await;
        match operation {
            Operation::Set(target) => self.apply(target).await,
            Operation::Toggle => {
                // Read inside the critical section so a queued toggle sees the previous result
                let target = self.snapshot_tx.borrow().current_state.toggled();
                self.apply(target).await
            }
            Operation::Refresh => self.requery().await,
        }
    }

    async fn requery(&self) -> AdapterState {
        let (observed, outcome) = match self.gateway.query(&self.handle).await {
            Ok(state) => (state, OperationOutcome::Detected),
            Err(e) => {
                warn!("{}", e);
                (AdapterState::Unknown, OperationOutcome::Failed(e))
            }
        };
        self.record(observed, outcome);
        observed
    }

    async fn apply(&self, target: TargetState) -> AdapterState {
        info!("Setting '{}' to {}", self.handle, target);

        let (observed, outcome) = match self.gateway.set_enabled(&self.handle, target).await {
            Ok(()) => {
                let verification = self
                    .verifier
                    .wait_for_state(&self.handle, target.into(), &self.policy)
                    .await;

                if verification.matched {
                    info!("'{}' is now {}", self.handle, verification.observed);
                    (verification.observed, OperationOutcome::Verified { target })
                } else {
                    let error = AdapterError::VerificationTimeout {
                        adapter: self.handle.name().to_string(),
                        expected: target.into(),
                        observed: verification.observed,
                        attempts: verification.attempts,
                    };
                    warn!("{}", error);
                    (verification.observed, OperationOutcome::Failed(error))
                }
            }
            Err(error) => {
                warn!("{}", error);
                // The adapter may have partially changed, so look instead of assuming
                let observed = self.gateway.query(&self.handle).await.unwrap_or_else(|e| {
                    warn!("{}", e);
                    AdapterState::Unknown
                });
                (observed, OperationOutcome::Failed(error))
            }
        };

        self.record(observed, outcome);
        observed
    }

    fn record(&self, observed: AdapterState, outcome: OperationOutcome) {
        self.snapshot_tx.send_modify(|snapshot| snapshot.record(observed, outcome));
    }
}
