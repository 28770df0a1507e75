//! Delayed action timer state

use serde::Serialize;

/// Lifecycle of a timer session: Idle -> Running -> (Completed | Cancelled) -> Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionOutcome {
    /// Waited the full duration and re-enabled the adapter
    Completed,
    /// Observed the cancel flag and stopped
    Cancelled,
    /// Did not stop within the bounded join and was aborted
    Aborted,
}

impl SessionOutcome {
    pub fn phase(self) -> TimerPhase {
        match self {
            Self::Completed => TimerPhase::Completed,
            Self::Cancelled | Self::Aborted => TimerPhase::Cancelled,
        }
    }
}

/// A session that is no longer running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinishedSession {
    pub id: u64,
    pub outcome: SessionOutcome,
}

/// Timer state for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct TimerStatus {
    pub phase: TimerPhase,
    pub session_id: Option<u64>,
    pub duration_seconds: Option<u64>,
    pub remaining_seconds: Option<u64>,
}

impl TimerStatus {
    /// Create an idle timer status
    pub fn idle() -> Self {
        Self::default()
    }

    /// Create a running timer status with remaining seconds
    pub fn running(session_id: u64, duration_seconds: u64, remaining_seconds: u64) -> Self {
        Self {
            phase: TimerPhase::Running,
            session_id: Some(session_id),
            duration_seconds: Some(duration_seconds),
            remaining_seconds: Some(remaining_seconds),
        }
    }

    /// Create the status of a session that just ended
    pub fn finished(session: FinishedSession) -> Self {
        Self {
            phase: session.outcome.phase(),
            session_id: Some(session.id),
            duration_seconds: None,
            remaining_seconds: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Get remaining seconds if the timer is running
    pub fn remaining_seconds(&self) -> Option<u64> {
        if self.is_running() {
            self.remaining_seconds
        } else {
            None
        }
    }
}
