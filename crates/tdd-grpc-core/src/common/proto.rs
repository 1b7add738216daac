//! gRPC service and message definitions generated from `proto/tdd.proto`.
//!
//! ## Service
//!
//! - `TLV1` - Unary call taking `google.protobuf.Empty` (Rust `()`) and
//!   returning a [`ResponseSingle`].
//! - `TLV2` - Server-streaming call taking a [`RequestForm`] and returning a
//!   sequence of [`ResponseSingle`] messages.
//!
//! The client stub lives in [`tdd_v1_client`] and the server trait in
//! [`tdd_v1_server`].

tonic::include_proto!("tdd");

/// Encoded descriptor set for `tdd.proto`, registered with the reflection
/// service.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("tdd_descriptor");
