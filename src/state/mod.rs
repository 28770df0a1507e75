//! State management module
//!
//! Plain data types describing the adapter, the controller snapshot and the timer.

pub mod adapter_state;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use adapter_state::{AdapterHandle, AdapterState, TargetState};
pub use snapshot::{ControllerSnapshot, OperationOutcome};
pub use timer_state::{FinishedSession, SessionOutcome, TimerPhase, TimerStatus};
