//! Background tasks module
//!
//! This module contains the delayed action timer that runs alongside the host.

pub mod delayed_action;

// Re-export main types
pub use delayed_action::{DelayedActionTimer, TimerSettings};
