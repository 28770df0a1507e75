//! Adapter Toggle - controls the enabled state of a single network adapter
//!
//! The core issues enable/disable commands, verifies that the adapter really
//! reached the requested state, and runs a cancellable "disable for a while"
//! timer without racing manual toggles.

pub mod adapter;
pub mod config;
pub mod controller;
pub mod host;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use controller::Controller;
pub use host::Host;
pub use state::{AdapterHandle, AdapterState, ControllerSnapshot, TargetState};
pub use tasks::DelayedActionTimer;
pub use utils::signals::shutdown_signal;
