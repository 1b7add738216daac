use crate::server::{config::ServerConfig, telemetry::increment_messages_sent};
use core::time::Duration;
use tdd_grpc_core::{
    Error,
    proto::ResponseSingle,
    types::stream_message,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;

type ResponseSender = mpsc::Sender<Result<ResponseSingle, Status>>;

/// How long a stream waits for buffer room to deliver the shutdown status.
const SHUTDOWN_NOTICE_TIMEOUT: Duration = Duration::from_secs(1);

/// Emits the messages of one `TLV2` stream into `resp_tx`.
///
/// Steps run from 1 to `stream_messages`, pausing `stream_interval` after
/// each message. Reaching `fail_at_step` sends `INVALID_ARGUMENT` instead of
/// the message and ends the stream.
///
/// # Behavior
///
/// - Returns `Ok(())` after the last message; dropping `resp_tx` then ends
///   the gRPC stream cleanly.
/// - Stops with [`Error::RequestCancelled`] once the client goes away.
/// - Stops with [`Error::ServiceShutdown`] when `shutdown` fires, including
///   while blocked on a full buffer. No message is sent after shutdown; the
///   client gets `UNAVAILABLE` if it reads within [`SHUTDOWN_NOTICE_TIMEOUT`].
pub async fn feed_messages(
    req: String,
    resp_tx: ResponseSender,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> tdd_grpc_core::Result<()> {
    for step in 1..=config.stream_messages {
        if config.fail_at_step == Some(step) {
            let reason = format!("Invalid step {step}");
            let status = Status::from(Error::InvalidRequest {
                reason: reason.clone(),
            });
            send_or_shutdown(&resp_tx, Err(status), &shutdown).await?;
            return Err(Error::InvalidRequest { reason });
        }

        let message = ResponseSingle {
            message: stream_message(step, &req),
        };
        send_or_shutdown(&resp_tx, Ok(message), &shutdown).await?;
        increment_messages_sent();

        tokio::select! {
            biased;
            () = shutdown.cancelled() => return Err(notify_shutdown(&resp_tx).await),
            () = resp_tx.closed() => return Err(Error::RequestCancelled),
            () = tokio::time::sleep(config.stream_interval) => {}
        }
    }

    Ok(())
}

/// Sends `item` unless shutdown fires first, even when the buffer is full.
async fn send_or_shutdown(
    resp_tx: &ResponseSender,
    item: Result<ResponseSingle, Status>,
    shutdown: &CancellationToken,
) -> tdd_grpc_core::Result<()> {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => Err(notify_shutdown(resp_tx).await),
        sent = resp_tx.send(item) => sent.map_err(|_| Error::RequestCancelled),
    }
}

/// Best effort to end the stream with `UNAVAILABLE`.
async fn notify_shutdown(resp_tx: &ResponseSender) -> Error {
    let notice = resp_tx.send(Err(Error::ServiceShutdown.into()));
    match tokio::time::timeout(SHUTDOWN_NOTICE_TIMEOUT, notice).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Failed to forward err: {}", e),
        Err(_) => tracing::warn!("Client not reading; dropping shutdown notice"),
    }
    Error::ServiceShutdown
}
