//! Server-streaming consumption.
//!
//! [`open`] issues the request and returns a [`StreamHandle`]. Each
//! [`StreamHandle::next`] pulls exactly one item and resolves to one of three
//! outcomes:
//!
//! - `Ok(StreamEvent::Message(_))` - another message, the stream stays open.
//! - `Ok(StreamEvent::Completed)` - clean end-of-stream.
//! - `Err(Error::Rpc(_))` - the stream failed before completing.
//!
//! After `Completed` or a failure the handle is terminal: further calls
//! return [`Error::StreamTerminated`] without touching the transport.

use super::context::CallContext;
use core::future::Future;
use futures::{Stream, StreamExt, stream::BoxStream};
use tdd_grpc_core::{Error, Result, RpcError};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Completed,
    Failed,
}

impl StreamState {
    fn as_str(self) -> &'static str {
        match self {
            StreamState::Open => "open",
            StreamState::Completed => "completed",
            StreamState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent<R> {
    Message(R),
    Completed,
}

/// Cursor over an in-order server stream. Owned by one consumer.
pub struct StreamHandle<R> {
    inner: BoxStream<'static, core::result::Result<R, Status>>,
    cancellation: CancellationToken,
    state: StreamState,
}

impl<R> core::fmt::Debug for StreamHandle<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Opens a server stream. Failing to open is reported like a unary failure.
pub async fn open<T, R, S, F, Fut>(
    ctx: &CallContext,
    message: T,
    dispatch: F,
) -> Result<StreamHandle<R>>
where
    F: FnOnce(Request<T>) -> Fut,
    Fut: Future<Output = core::result::Result<S, Status>>,
    S: Stream<Item = core::result::Result<R, Status>> + Send + 'static,
{
    let request = ctx.request(message);

    let stream = tokio::select! {
        biased;
        () = ctx.cancelled() => return Err(Error::Rpc(RpcError::cancelled())),
        opened = dispatch(request) => opened?,
    };

    Ok(StreamHandle {
        inner: stream.boxed(),
        cancellation: ctx.cancellation().clone(),
        state: StreamState::Open,
    })
}

impl<R> StreamHandle<R> {
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Waits for the next message, the end of the stream, or a failure.
    pub async fn next(&mut self) -> Result<StreamEvent<R>> {
        if self.state != StreamState::Open {
            return Err(Error::StreamTerminated {
                state: self.state.as_str(),
            });
        }

        let item = tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Some(Err(RpcError::cancelled().into())),
            item = self.inner.next() => item,
        };

        match item {
            Some(Ok(message)) => Ok(StreamEvent::Message(message)),
            None => {
                self.state = StreamState::Completed;
                Ok(StreamEvent::Completed)
            }
            Some(Err(status)) => {
                self.state = StreamState::Failed;
                Err(Error::Rpc(status.into()))
            }
        }
    }
}

/// How a drained stream ended.
#[derive(Debug)]
pub enum Termination {
    Completed,
    Failed(Error),
}

#[derive(Debug)]
pub struct StreamOutcome {
    pub received: usize,
    pub termination: Termination,
}

/// Pulls every message from `handle`, handing each to `on_message`, until the
/// stream completes or fails. Never polls a terminal handle.
pub async fn drain<R, F>(handle: &mut StreamHandle<R>, mut on_message: F) -> StreamOutcome
where
    F: FnMut(R),
{
    let mut received = 0;
    loop {
        match handle.next().await {
            Ok(StreamEvent::Message(message)) => {
                received += 1;
                on_message(message);
            }
            Ok(StreamEvent::Completed) => {
                return StreamOutcome {
                    received,
                    termination: Termination::Completed,
                };
            }
            Err(e) => {
                return StreamOutcome {
                    received,
                    termination: Termination::Failed(e),
                };
            }
        }
    }
}
