use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use tdd_grpc_core::types::DEFAULT_SERVER_ADDR;

/// Runtime configuration for the `tdd-grpc-server` binary.
///
/// All values are parsed from CLI arguments or environment variables. The
/// defaults reproduce the demo behaviour: ten messages, 300 ms apart, with an
/// injected failure at step five.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tdd-grpc-server",
    version,
    about = "A demo Tdd_V1 gRPC service with unary and server-streaming calls"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from(DEFAULT_SERVER_ADDR))]
    pub server_addr: String,

    /// Number of messages a `TLV2` stream emits when it runs to completion.
    ///
    /// Environment variable: `STREAM_MESSAGES`
    #[arg(long, env = "STREAM_MESSAGES", default_value_t = 10)]
    pub stream_messages: u32,

    /// Step at which a `TLV2` stream is failed with `INVALID_ARGUMENT`
    /// instead of emitting its message. `0` disables the failure.
    ///
    /// Environment variable: `FAIL_AT_STEP`
    #[arg(long, env = "FAIL_AT_STEP", default_value_t = 5)]
    pub fail_at_step: u32,

    /// Pause after each streamed message, in milliseconds.
    ///
    /// Environment variable: `STREAM_INTERVAL_MS`
    #[arg(long, env = "STREAM_INTERVAL_MS", default_value_t = 300)]
    pub stream_interval_ms: u64,

    /// Capacity of the buffer between the producer task and the gRPC stream.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub stream_messages: u32,
    pub fail_at_step: Option<u32>,
    pub stream_interval: Duration,
    pub stream_buffer_size: usize,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.stream_messages == 0 {
            bail!("STREAM_MESSAGES must be greater than 0");
        }

        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            stream_messages: args.stream_messages,
            fail_at_step: (args.fail_at_step > 0).then_some(args.fail_at_step),
            stream_interval: Duration::from_millis(args.stream_interval_ms),
            stream_buffer_size: args.stream_buffer_size,
        })
    }
}
