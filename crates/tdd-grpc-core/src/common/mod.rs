//! Definitions shared by the client and the server.
//!
//! - [`error`] - Unified error type and the RPC failure classification.
//! - [`proto`] - Generated Protobuf messages and service bindings.
//! - [`types`] - Wire constants and defaults.

pub mod error;
pub mod proto;
pub mod types;

pub use error::{Error, Result, RpcError};
