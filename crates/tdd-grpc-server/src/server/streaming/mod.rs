//! Producer side of the `TLV2` server stream.
//!
//! - [`producer`] - Emits the scripted messages into the response channel.

pub mod producer;
