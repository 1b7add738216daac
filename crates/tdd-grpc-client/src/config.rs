use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use tdd_grpc_core::types::{
    DEFAULT_AUTH_TOKEN, DEFAULT_CLIENT_TARGET, DEFAULT_STREAM_REQUEST,
};
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::Endpoint;

/// Runtime configuration for the `tdd-grpc-client` binary.
///
/// All values are parsed from CLI arguments or environment variables. The
/// defaults reproduce the fixed demo run against a local, unencrypted server.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tdd-grpc-client",
    version,
    about = "Runs the unary, metadata, and server-streaming demo calls against a Tdd_V1 server"
)]
pub struct CliArgs {
    /// URI of the remote endpoint.
    ///
    /// Environment variable: `TDD_SERVER_URI`
    #[arg(long, env = "TDD_SERVER_URI", default_value_t = String::from(DEFAULT_CLIENT_TARGET))]
    pub server_uri: String,

    /// Establish an encrypted channel. Requires the `tls` feature.
    ///
    /// Environment variable: `TLS`
    #[arg(long, env = "TLS", default_value_t = false)]
    pub tls: bool,

    /// Upper bound for establishing the connection, in milliseconds.
    ///
    /// Environment variable: `CONNECT_TIMEOUT_MS`
    #[arg(long, env = "CONNECT_TIMEOUT_MS", default_value_t = 5_000)]
    pub connect_timeout_ms: u64,

    /// Value of the `authorization` metadata sent with the second call.
    ///
    /// Environment variable: `AUTH_TOKEN`
    #[arg(long, env = "AUTH_TOKEN", default_value_t = String::from(DEFAULT_AUTH_TOKEN))]
    pub auth_token: String,

    /// Payload of the server-streaming request.
    ///
    /// Environment variable: `STREAM_REQUEST`
    #[arg(long, env = "STREAM_REQUEST", default_value_t = String::from(DEFAULT_STREAM_REQUEST))]
    pub stream_request: String,
}

/// Whether the channel is established over TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    Insecure,
    Tls,
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub target: String,
    pub security: SecurityMode,
    pub connect_timeout: Duration,
}

/// Inputs of the demonstration calls.
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub auth_token: String,
    pub stream_request: String,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub calls: CallConfig,
}

impl TryFrom<CliArgs> for ClientConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Err(e) = Endpoint::from_shared(args.server_uri.clone()) {
            bail!("TDD_SERVER_URI ({}) is not a valid URI: {}", args.server_uri, e);
        }

        if args.connect_timeout_ms == 0 {
            bail!("CONNECT_TIMEOUT_MS must be greater than 0");
        }

        if args.auth_token.is_empty() {
            bail!("AUTH_TOKEN must not be empty");
        }

        if AsciiMetadataValue::try_from(args.auth_token.as_str()).is_err() {
            bail!("AUTH_TOKEN must be printable ASCII");
        }

        let security = if args.tls {
            SecurityMode::Tls
        } else {
            SecurityMode::Insecure
        };

        Ok(Self {
            connection: ConnectionConfig {
                target: args.server_uri,
                security,
                connect_timeout: Duration::from_millis(args.connect_timeout_ms),
            },
            calls: CallConfig {
                auth_token: args.auth_token,
                stream_request: args.stream_request,
            },
        })
    }
}
