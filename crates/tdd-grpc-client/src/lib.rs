#![doc = include_str!("../README.md")]
//!
//! ## Modules
//!
//! - [`config`] - CLI/env configuration.
//! - [`telemetry`] - Log subscriber setup.
//! - [`connection`] - The long-lived channel to the remote endpoint.
//! - [`context`] - Per-call metadata, deadline, and cancellation.
//! - [`api`] - The `Tdd_V1` operations as a trait.
//! - [`unary`] - One request, one response.
//! - [`stream`] - Server-streaming consumption.
//! - [`driver`] - Runs the demonstration calls in order.

pub mod api;
pub mod config;
pub mod connection;
pub mod context;
pub mod driver;
pub mod stream;
pub mod telemetry;
pub mod unary;

#[cfg(test)]
pub(crate) mod testing;
