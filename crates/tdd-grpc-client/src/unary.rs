//! One request, one response.

use super::context::CallContext;
use core::future::Future;
use tdd_grpc_core::{Error, Result, RpcError};
use tonic::{Request, Status};

/// Issues a single call and waits for its outcome.
///
/// The request is built from `ctx` (metadata, deadline) and handed to
/// `dispatch`, typically one of the [`TddApi`] methods. Exactly one of a
/// response or an [`Error::Rpc`] is returned. Cancelling the context's token
/// abandons the call with [`RpcError::cancelled`].
///
/// [`TddApi`]: super::api::TddApi
pub async fn invoke<T, R, F, Fut>(ctx: &CallContext, message: T, dispatch: F) -> Result<R>
where
    F: FnOnce(Request<T>) -> Fut,
    Fut: Future<Output = core::result::Result<R, Status>>,
{
    let request = ctx.request(message);

    tokio::select! {
        biased;
        () = ctx.cancelled() => Err(Error::Rpc(RpcError::cancelled())),
        outcome = dispatch(request) => outcome.map_err(Error::from),
    }
}
