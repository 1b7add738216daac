pub mod call_log;
pub mod config;
pub mod service;
pub mod streaming;
pub mod telemetry;
