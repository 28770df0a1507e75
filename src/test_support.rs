//! Deterministic doubles shared by the unit tests

use std::{collections::VecDeque, sync::Mutex, time::Duration};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{
    adapter::{
        AdapterError, AdapterGateway, ExecError, StateVerifier, Verification, VerifyPolicy,
    },
    services::{
        AdapterDirectory, CommandExecutor, CommandOutput, CommandRequest, DiscoveredAdapter,
    },
    state::{AdapterHandle, AdapterState, TargetState},
};

/// Assert that `expected` has passed since `start`, allowing for timer rounding
#[track_caller]
pub fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(20),
        "expected {:?} to have elapsed, got {:?}",
        expected,
        elapsed
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCall {
    Query,
    Set(TargetState),
}

/// Gateway that replays scripted query results
///
/// Once the script runs out, the last query result repeats.
pub struct ScriptedGateway {
    queries: Mutex<VecDeque<Result<AdapterState, AdapterError>>>,
    last_query: Mutex<Result<AdapterState, AdapterError>>,
    command_error: Option<String>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    pub fn with_queries(queries: Vec<Result<AdapterState, AdapterError>>) -> Self {
        Self {
            queries: Mutex::new(queries.into()),
            last_query: Mutex::new(Ok(AdapterState::Unknown)),
            command_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(state: AdapterState) -> Self {
        Self::with_queries(vec![Ok(state)])
    }

    /// Every command and query fails, as for an adapter that does not exist
    pub fn missing_adapter() -> Self {
        Self::with_queries(vec![Err(AdapterError::QueryFailed {
            adapter: "Ethernet".to_string(),
            reason: "No MSFT_NetAdapter objects found".to_string(),
        })])
        .with_failing_commands("No MSFT_NetAdapter objects found")
    }

    pub fn with_failing_commands(mut self, reason: &str) -> Self {
        self.command_error = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.calls().iter().filter(|call| **call == GatewayCall::Query).count()
    }

    pub fn set_calls(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, GatewayCall::Set(_))).count()
    }
}

#[async_trait]
impl AdapterGateway for ScriptedGateway {
    async fn query(&self, _handle: &AdapterHandle) -> Result<AdapterState, AdapterError> {
        self.calls.lock().unwrap().push(GatewayCall::Query);
        let mut last = self.last_query.lock().unwrap();
        if let Some(next) = self.queries.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }

    async fn set_enabled(
        &self,
        handle: &AdapterHandle,
        target: TargetState,
    ) -> Result<(), AdapterError> {
        self.calls.lock().unwrap().push(GatewayCall::Set(target));
        match &self.command_error {
            Some(reason) => Err(AdapterError::CommandFailed {
                adapter: handle.name().to_string(),
                target,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

struct SimulatedState {
    actual: AdapterState,
    pending: Option<(AdapterState, Instant)>,
}

/// An adapter whose state changes `settle` after a command, like a real driver
pub struct SimulatedAdapter {
    state: Mutex<SimulatedState>,
    settle: Duration,
    command_delay: Duration,
    calls: Mutex<Vec<(GatewayCall, Instant)>>,
}

impl SimulatedAdapter {
    pub fn new(initial: AdapterState) -> Self {
        Self {
            state: Mutex::new(SimulatedState { actual: initial, pending: None }),
            settle: Duration::ZERO,
            command_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Make every enable/disable command take this long to return
    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().iter().map(|(call, _)| *call).collect()
    }

    pub fn set_targets(&self) -> Vec<TargetState> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Set(target) => Some(target),
                GatewayCall::Query => None,
            })
            .collect()
    }

    /// When each enable/disable command was issued
    pub fn set_times(&self) -> Vec<(TargetState, Instant)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(call, at)| match call {
                GatewayCall::Set(target) => Some((*target, *at)),
                GatewayCall::Query => None,
            })
            .collect()
    }

    pub fn actual(&self) -> AdapterState {
        let mut state = self.state.lock().unwrap();
        Self::settle_pending(&mut state);
        state.actual
    }

    fn settle_pending(state: &mut SimulatedState) {
        if let Some((target, at)) = state.pending {
            if Instant::now() >= at {
                state.actual = target;
                state.pending = None;
            }
        }
    }
}

#[async_trait]
impl AdapterGateway for SimulatedAdapter {
    async fn query(&self, _handle: &AdapterHandle) -> Result<AdapterState, AdapterError> {
        self.calls.lock().unwrap().push((GatewayCall::Query, Instant::now()));
        Ok(self.actual())
    }

    async fn set_enabled(
        &self,
        _handle: &AdapterHandle,
        target: TargetState,
    ) -> Result<(), AdapterError> {
        self.calls.lock().unwrap().push((GatewayCall::Set(target), Instant::now()));
        if !self.command_delay.is_zero() {
            tokio::time::sleep(self.command_delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.pending = Some((target.into(), Instant::now() + self.settle));
        Self::settle_pending(&mut state);
        Ok(())
    }
}

/// Verifier that reports scripted observations without sleeping
pub struct ScriptedVerifier {
    observations: Mutex<VecDeque<AdapterState>>,
    expected: Mutex<Vec<AdapterState>>,
}

impl ScriptedVerifier {
    pub fn new(observations: Vec<AdapterState>) -> Self {
        Self {
            observations: Mutex::new(observations.into()),
            expected: Mutex::new(Vec::new()),
        }
    }

    /// The states each call waited for
    pub fn expected(&self) -> Vec<AdapterState> {
        self.expected.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateVerifier for ScriptedVerifier {
    async fn wait_for_state(
        &self,
        _handle: &AdapterHandle,
        expected: AdapterState,
        policy: &VerifyPolicy,
    ) -> Verification {
        self.expected.lock().unwrap().push(expected);
        let observed = self.observations.lock().unwrap().pop_front().unwrap_or_default();
        let matched = observed == expected;
        Verification {
            observed,
            matched,
            attempts: if matched { 1 } else { policy.max_attempts },
        }
    }
}

/// Executor that replays scripted results and records what it was asked
pub struct FakeExecutor {
    results: Mutex<VecDeque<Result<CommandOutput, ExecError>>>,
    requests: Mutex<Vec<(CommandRequest, Duration)>>,
}

impl FakeExecutor {
    pub fn new(results: Vec<Result<CommandOutput, ExecError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().unwrap().iter().map(|(request, _)| request.clone()).collect()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.requests.lock().unwrap().iter().map(|(_, timeout)| *timeout).collect()
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute(
        &self,
        request: &CommandRequest,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecError> {
        self.requests.lock().unwrap().push((request.clone(), timeout));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CommandOutput::default()))
    }
}

/// Directory with a fixed answer
pub struct FakeDirectory {
    result: Result<Option<DiscoveredAdapter>, AdapterError>,
}

impl FakeDirectory {
    pub fn found(name: &str, state: AdapterState) -> Self {
        Self {
            result: Ok(Some(DiscoveredAdapter {
                handle: AdapterHandle::new(name),
                state,
            })),
        }
    }

    pub fn empty() -> Self {
        Self { result: Ok(None) }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(AdapterError::QueryFailed {
                adapter: "*".to_string(),
                reason: reason.to_string(),
            }),
        }
    }
}

#[async_trait]
impl AdapterDirectory for FakeDirectory {
    async fn find_first_matching(
        &self,
        _pattern: &str,
    ) -> Result<Option<DiscoveredAdapter>, AdapterError> {
        self.result.clone()
    }
}
