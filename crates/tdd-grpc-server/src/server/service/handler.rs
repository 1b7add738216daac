//! gRPC service implementation for the `Tdd_V1` demo.
//!
//! This module defines [`TddService`], the concrete implementation of the
//! [`TddV1`] gRPC service defined in `proto/tdd.proto`.
//!
//! ## Responsibilities
//!
//! - Answer `TLV1` with a fixed greeting.
//! - Run one producer task per `TLV2` stream via [`feed_messages`].
//! - End every in-flight stream on shutdown.

use crate::server::{
    call_log::log_call,
    config::ServerConfig,
    streaming::producer::feed_messages,
    telemetry::{
        decrement_streams_inflight, increment_requests, increment_stream_errors,
        increment_streams_inflight,
    },
};
use core::pin::Pin;
use futures::TryStreamExt;
use tdd_grpc_core::{
    Error,
    proto::{RequestForm, ResponseSingle, tdd_v1_server::TddV1},
    types::{TLV1_GREETING, TLV1_METHOD, TLV2_METHOD},
};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

/// The `Tdd_V1` service. Cheap to clone; clones share the shutdown token.
#[derive(Clone)]
pub struct TddService {
    config: ServerConfig,
    shutdown_token: CancellationToken,
}

impl TddService {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Ends every in-flight stream with `UNAVAILABLE` and rejects new ones.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

#[tonic::async_trait]
impl TddV1 for TddService {
    #[tracing::instrument(skip_all)]
    async fn tlv1(&self, req: Request<()>) -> Result<Response<ResponseSingle>, Status> {
        log_call(TLV1_METHOD, req.metadata());
        increment_requests("TLV1");
        Ok(Response::new(ResponseSingle {
            message: TLV1_GREETING.to_string(),
        }))
    }

    type TLV2Stream = Pin<Box<dyn Stream<Item = Result<ResponseSingle, Status>> + Send>>;

    /// Streams the scripted messages for `req`.
    ///
    /// The producer runs on its own task and feeds a bounded channel, so a
    /// slow client applies backpressure instead of buffering the stream.
    #[tracing::instrument(skip_all, fields(req = %req.get_ref().req))]
    async fn tlv2(
        &self,
        req: Request<RequestForm>,
    ) -> Result<Response<Self::TLV2Stream>, Status> {
        log_call(TLV2_METHOD, req.metadata());
        increment_requests("TLV2");

        if self.shutdown_token.is_cancelled() {
            increment_stream_errors();
            return Err(Error::ServiceShutdown.into());
        }

        increment_streams_inflight();

        let (resp_tx, resp_rx) =
            mpsc::channel::<Result<ResponseSingle, Status>>(self.config.stream_buffer_size);

        let form = req.into_inner();
        let config = self.config.clone();
        let shutdown = self.shutdown_token.clone();

        let fut = async move {
            match feed_messages(form.req, resp_tx, config, shutdown).await {
                Ok(()) => tracing::info!("Stream completed"),
                Err(Error::RequestCancelled) => tracing::info!("Client went away"),
                Err(e) => tracing::warn!("Stream ended with error: {}", e),
            }
            decrement_streams_inflight();
        };
        let fut = {
            use tracing::Instrument;
            let span = tracing::info_span!("streaming");
            fut.instrument(span)
        };

        tokio::spawn(fut);

        let stream = ReceiverStream::new(resp_rx).inspect_err(|_e| {
            increment_stream_errors();
        });

        Ok(Response::new(Box::pin(stream)))
    }
}
