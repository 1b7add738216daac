//! The long-lived channel to the remote endpoint.
//!
//! A [`Connection`] is opened eagerly, so an unreachable endpoint is reported
//! at startup rather than on the first call. The channel multiplexes every
//! call issued through it and is cheap to clone internally; callers share a
//! single `&Connection` and never need to lock it.

use super::config::{ConnectionConfig, SecurityMode};
use tdd_grpc_core::{Error, Result, proto::tdd_v1_client::TddV1Client};
use tonic::{codec::CompressionEncoding, transport::Channel, transport::Endpoint};

/// An established channel to a single `Tdd_V1` endpoint.
///
/// Owned by the caller for the lifetime of the run. Dropping it (or calling
/// [`Connection::close`]) releases the underlying transport; ownership makes a
/// second release impossible.
#[derive(Debug)]
pub struct Connection {
    target: String,
    security: SecurityMode,
    client: TddV1Client<Channel>,
}

impl Connection {
    /// Establishes the channel. No retries: any failure is returned as-is.
    pub async fn open(config: &ConnectionConfig) -> Result<Self> {
        let endpoint = Endpoint::from_shared(config.target.clone())
            .map_err(|source| Error::InvalidEndpoint {
                target: config.target.clone(),
                source,
            })?
            .connect_timeout(config.connect_timeout);

        let endpoint = match config.security {
            SecurityMode::Insecure => endpoint,
            SecurityMode::Tls => secure(endpoint, &config.target)?,
        };

        let channel = endpoint
            .connect()
            .await
            .map_err(|source| Error::Connection {
                target: config.target.clone(),
                source,
            })?;

        tracing::info!(
            "Connected to {} ({:?})",
            config.target,
            config.security
        );

        let client = TddV1Client::new(channel).accept_compressed(CompressionEncoding::Gzip);

        Ok(Self {
            target: config.target.clone(),
            security: config.security,
            client,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn security(&self) -> SecurityMode {
        self.security
    }

    /// Handle used to dispatch a single call. Clones share the channel.
    pub(crate) fn client(&self) -> TddV1Client<Channel> {
        self.client.clone()
    }

    /// Releases the channel. No calls can be issued afterwards.
    pub fn close(self) {
        tracing::info!("Closing connection to {}", self.target);
    }
}

#[cfg(feature = "tls")]
fn secure(endpoint: Endpoint, target: &str) -> Result<Endpoint> {
    use tonic::transport::ClientTlsConfig;

    endpoint
        .tls_config(ClientTlsConfig::new().with_native_roots())
        .map_err(|source| Error::InvalidEndpoint {
            target: target.to_string(),
            source,
        })
}

#[cfg(not(feature = "tls"))]
fn secure(_endpoint: Endpoint, target: &str) -> Result<Endpoint> {
    Err(Error::TlsUnavailable {
        target: target.to_string(),
    })
}
