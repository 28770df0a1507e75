//! External collaborators
//!
//! This module contains the command executor that talks to the host's
//! adapter tooling, output parsing, and the adapter directory used at startup.

pub mod directory;
pub mod executor;
pub mod parse;
pub mod system;

// Re-export main types
pub use directory::{
    resolve_adapter, AdapterDirectory, CommandDirectory, DiscoveredAdapter, ResolvedAdapter,
};
pub use executor::{CommandExecutor, CommandOutput, CommandRequest};
pub use system::{check_adapter_tool_available, SystemExecutor};
