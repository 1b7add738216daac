//! Per-call context: metadata, deadline, and cancellation.
//!
//! A [`CallContext`] is built fresh for every call and never mutated once
//! constructed. Deriving a new context (for example with
//! [`CallContext::with_metadata`]) copies the base and leaves it untouched,
//! so metadata attached for one call cannot leak into another.

use core::time::Duration;
use tdd_grpc_core::{Error, Result};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tonic::Request;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue, MetadataMap};

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: CancellationToken,
    deadline: Option<Duration>,
    metadata: MetadataMap,
}

impl CallContext {
    /// Context with no metadata, no deadline, and a token nobody cancels.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a context that additionally transmits `pairs` as call
    /// metadata. Repeated keys are kept as multiple values.
    pub fn with_metadata<I, K, V>(&self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut metadata = self.metadata.clone();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            let parsed_key = AsciiMetadataKey::from_bytes(key.as_bytes()).map_err(|e| {
                Error::InvalidMetadata {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
            })?;
            let parsed_value =
                AsciiMetadataValue::try_from(value).map_err(|e| Error::InvalidMetadata {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
            metadata.append(parsed_key, parsed_value);
        }

        Ok(Self {
            metadata,
            ..self.clone()
        })
    }

    /// Derives a context whose calls time out after `deadline`.
    pub fn with_deadline(&self, deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    /// Derives a context observing `token` instead of the base's token.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            ..self.clone()
        }
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub(crate) fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }

    /// Wraps `message` in a request carrying this context's metadata and
    /// deadline. The message itself is not altered.
    pub(crate) fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        *request.metadata_mut() = self.metadata.clone();
        if let Some(deadline) = self.deadline {
            request.set_timeout(deadline);
        }
        request
    }
}
