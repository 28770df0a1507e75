//! Adapter access: command gateway, status verifier and their errors

pub mod error;
pub mod gateway;
pub mod verifier;

pub use error::{AdapterError, ExecError};
pub use gateway::{AdapterGateway, CommandGateway, GatewayTimeouts};
pub use verifier::{PollingVerifier, StateVerifier, Verification, VerifyPolicy};
