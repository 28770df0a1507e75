//! Error taxonomy for adapter operations

use serde::Serialize;
use thiserror::Error;

use crate::state::{AdapterState, TargetState};

/// Everything that can go wrong while controlling the adapter
///
/// None of these are fatal. The controller folds them into the snapshot
/// so the rendered state always shows the best-known truth.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum AdapterError {
    /// No adapter matched the pattern at startup
    #[error("no adapter matching '{pattern}' was found")]
    AdapterNotFound { pattern: String },

    /// Status query errored, timed out or returned unparsable output
    #[error("status query for '{adapter}' failed: {reason}")]
    QueryFailed { adapter: String, reason: String },

    /// Enable/disable command errored, timed out or was rejected
    #[error("failed to {action} '{adapter}': {reason}", action = .target.verb())]
    CommandFailed {
        adapter: String,
        target: TargetState,
        reason: String,
    },

    /// The adapter never reported the expected state within the attempt budget
    #[error("'{adapter}' still {observed} after {attempts} checks, expected {expected}")]
    VerificationTimeout {
        adapter: String,
        expected: AdapterState,
        observed: AdapterState,
        attempts: u32,
    },
}

/// Failure of a single external command invocation
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {seconds}s")]
    TimedOut { program: String, seconds: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_names_the_action() {
        let error = AdapterError::CommandFailed {
            adapter: "Ethernet".to_string(),
            target: TargetState::Disabled,
            reason: "access denied".to_string(),
        };
        assert_eq!(error.to_string(), "failed to disable 'Ethernet': access denied");
    }

    #[test]
    fn verification_timeout_reports_both_states() {
        let error = AdapterError::VerificationTimeout {
            adapter: "eth0".to_string(),
            expected: AdapterState::Disabled,
            observed: AdapterState::Enabled,
            attempts: 10,
        };
        let message = error.to_string();
        assert!(message.contains("still Enabled"));
        assert!(message.contains("expected Disabled"));
        assert!(message.contains("10 checks"));
    }

    #[test]
    fn timed_out_includes_program_and_limit() {
        let error = ExecError::TimedOut {
            program: "powershell".to_string(),
            seconds: 30,
        };
        assert_eq!(error.to_string(), "'powershell' timed out after 30s");
    }
}
