//! Logs the caller-supplied metadata of every `Tdd_V1` call.

use tdd_grpc_core::types::AUTHORIZATION_KEY;
use tonic::metadata::MetadataMap;

const NOT_PROVIDED: &str = "[not provided]";

/// The `authorization` value of a call, or a placeholder when absent or not
/// printable.
pub fn auth_token(metadata: &MetadataMap) -> &str {
    metadata
        .get(AUTHORIZATION_KEY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(NOT_PROVIDED)
}

/// Records the called method, its auth token and its headers.
pub fn log_call(method: &str, metadata: &MetadataMap) {
    tracing::info!(
        "Received gRPC call. Method: {}, Auth Token: {}, Headers: {:?}",
        method,
        auth_token(metadata),
        metadata
    );
}
