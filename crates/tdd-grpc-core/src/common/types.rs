//! Wire constants and defaults shared by the client and the server.
//!
//! The defaults mirror the fixed endpoint and credentials the demo was built
//! around so that both binaries interoperate with no configuration.

/// Address the client dials when none is configured.
pub const DEFAULT_CLIENT_TARGET: &str = "http://localhost:9090";

/// Address the server binds when none is configured.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:9090";

/// The only metadata key this protocol recognizes.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Bearer token attached to the metadata-carrying unary call by default.
pub const DEFAULT_AUTH_TOKEN: &str = "Bearer my-secret-token";

/// Payload of the `TLV2` request sent by the default client run.
pub const DEFAULT_STREAM_REQUEST: &str = "Stream Request";

/// Full gRPC path of the unary `TLV1` call.
pub const TLV1_METHOD: &str = "/tdd.Tdd_V1/TLV1";

/// Full gRPC path of the server-streaming `TLV2` call.
pub const TLV2_METHOD: &str = "/tdd.Tdd_V1/TLV2";

/// Greeting returned by `TLV1`.
pub const TLV1_GREETING: &str = "Hello, TLV1";

/// Formats the `step`-th message streamed back by `TLV2`.
pub fn stream_message(step: u32, req: &str) -> String {
    format!("Message {step} for request: {req}")
}
