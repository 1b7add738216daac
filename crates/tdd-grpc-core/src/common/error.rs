//! Error types for the TDD gRPC client and server.
//!
//! This module defines the central [`Error`] enum, which captures every
//! reportable failure in the system, and [`RpcError`], the classification of a
//! failed remote call. `From<Error>` is implemented for [`tonic::Status`] so
//! server-side failures propagate to clients with an appropriate status code.
//!
//! ## Error Cases
//! - `InvalidEndpoint`: The configured target is not a valid URI.
//! - `Connection`: The channel could not be established.
//! - `TlsUnavailable`: An encrypted channel was requested without TLS support.
//! - `InvalidMetadata`: A call metadata key or value is malformed.
//! - `Rpc`: A remote call failed.
//! - `StreamTerminated`: A finished stream was polled again.
//! - `InvalidRequest`: The client request was rejected by the service.
//! - `RequestCancelled`: The client aborted the request.
//! - `ChannelError`: An internal communication failure between tasks.
//! - `ServiceShutdown`: The service is shutting down.

use tonic::{Code, Status};

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the TDD gRPC client and server.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The target address could not be turned into an endpoint.
    #[error("Invalid endpoint `{target}`: {source}")]
    InvalidEndpoint {
        target: String,
        source: tonic::transport::Error,
    },

    /// The channel to the remote endpoint could not be established.
    #[error("Failed to connect to {target}: {source}")]
    Connection {
        target: String,
        source: tonic::transport::Error,
    },

    /// An encrypted channel was requested but TLS support is not compiled in.
    #[error("TLS requested for {target} but the `tls` feature is disabled")]
    TlsUnavailable { target: String },

    /// A call metadata key or value cannot be transmitted.
    #[error("Invalid metadata `{key}`: {reason}")]
    InvalidMetadata { key: String, reason: String },

    /// The remote call failed.
    #[error("RPC failed: {0}")]
    Rpc(#[from] RpcError),

    /// A stream that already reached a terminal state was polled again.
    #[error("Stream already {state}")]
    StreamTerminated { state: &'static str },

    /// The client request was invalid.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The client aborted the request.
    #[error("Request cancelled by client")]
    RequestCancelled,

    /// Internal channel send/receive failure.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Rpc(status.into())
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidEndpoint { .. } | Error::TlsUnavailable { .. } => {
                Status::failed_precondition(err.to_string())
            }
            Error::Connection { .. } => Status::unavailable(err.to_string()),
            Error::InvalidMetadata { .. } => Status::invalid_argument(err.to_string()),
            Error::Rpc(e) => e.into(),
            Error::StreamTerminated { .. } => Status::failed_precondition(err.to_string()),
            Error::InvalidRequest { reason } => Status::invalid_argument(reason),
            Error::RequestCancelled => Status::cancelled("Request was cancelled"),
            Error::ChannelError { context } => {
                Status::internal(format!("Channel error: {}", context))
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

/// Outcome of a remote call that did not produce a response.
///
/// Carries the gRPC status classification together with the server-provided
/// description.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct RpcError {
    code: Code,
    message: String,
}

impl RpcError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The call was abandoned locally through its context.
    pub fn cancelled() -> Self {
        Self::new(Code::Cancelled, "Call cancelled by caller")
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Status> for RpcError {
    fn from(status: Status) -> Self {
        Self::new(status.code(), status.message())
    }
}

impl From<RpcError> for Status {
    fn from(err: RpcError) -> Self {
        Status::new(err.code, err.message)
    }
}
