//! Controller snapshot structure

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AdapterHandle, AdapterState, TargetState};
use crate::adapter::AdapterError;

/// What the last controller operation concluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OperationOutcome {
    /// Adapter resolved at startup and its state read
    Detected,
    /// Command accepted and the new state observed
    Verified { target: TargetState },
    /// Something went wrong; the snapshot state is whatever was observed afterwards
    Failed(AdapterError),
}

impl OperationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&AdapterError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Everything the presentation layer needs to render the adapter
///
/// Only the controller writes this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub adapter: AdapterHandle,
    /// Last verified observation, never an assumed result
    pub current_state: AdapterState,
    pub last_outcome: OperationOutcome,
    pub updated_at: DateTime<Utc>,
}

impl ControllerSnapshot {
    pub fn new(
        adapter: AdapterHandle,
        current_state: AdapterState,
        last_outcome: OperationOutcome,
    ) -> Self {
        Self {
            adapter,
            current_state,
            last_outcome,
            updated_at: Utc::now(),
        }
    }

    /// Record a new observation
    pub fn record(&mut self, observed: AdapterState, outcome: OperationOutcome) {
        self.current_state = observed;
        self.last_outcome = outcome;
        self.updated_at = Utc::now();
    }

    /// Indicator text, e.g. "Ethernet: Enabled"
    pub fn indicator_label(&self) -> String {
        format!("{}: {}", self.adapter, self.current_state)
    }
}
