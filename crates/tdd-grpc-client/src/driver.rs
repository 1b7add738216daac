//! Runs the three demonstration calls in order.
//!
//! 1. `TLV1` with a plain context.
//! 2. `TLV1` with the `authorization` token attached.
//! 3. `TLV2`, drained until the stream completes or fails.
//!
//! Failures of steps 1 and 2, or of opening the stream, end the run
//! immediately. A stream that fails after opening is logged and reported in
//! the [`DriverReport`]; the run still succeeds.

use super::api::TddApi;
use super::config::CallConfig;
use super::context::CallContext;
use super::{stream, unary};
use tdd_grpc_core::Result;
use tdd_grpc_core::proto::{RequestForm, ResponseSingle};
use tdd_grpc_core::types::AUTHORIZATION_KEY;

pub use super::stream::{StreamOutcome, Termination};

#[derive(Debug)]
pub struct DriverReport {
    pub unary: ResponseSingle,
    pub unary_with_metadata: ResponseSingle,
    pub stream: StreamOutcome,
}

pub async fn run<A>(api: &A, calls: &CallConfig) -> Result<DriverReport>
where
    A: TddApi + ?Sized,
{
    tracing::info!("--- Calling TLV1 (Unary) ---");
    let plain = unary::invoke(&CallContext::background(), (), |req| api.tlv1(req))
        .await
        .inspect_err(|e| tracing::error!("could not call TLV1: {}", e))?;
    tracing::info!("Response from TLV1: {}", plain.message);

    tracing::info!("--- Calling TLV1 with Metadata ---");
    let authed = CallContext::background()
        .with_metadata([(AUTHORIZATION_KEY, calls.auth_token.as_str())])?;
    let with_metadata = unary::invoke(&authed, (), |req| api.tlv1(req))
        .await
        .inspect_err(|e| tracing::error!("could not call TLV1 with metadata: {}", e))?;
    tracing::info!("Response from TLV1: {}", with_metadata.message);

    tracing::info!("--- Calling TLV2 (Server Streaming) ---");
    let form = RequestForm {
        req: calls.stream_request.clone(),
    };
    let mut handle = stream::open(&CallContext::background(), form, |req| api.tlv2(req))
        .await
        .inspect_err(|e| tracing::error!("could not call TLV2: {}", e))?;

    let outcome = stream::drain(&mut handle, |resp: ResponseSingle| {
        tracing::info!("Received stream message: {}", resp.message);
    })
    .await;

    match &outcome.termination {
        Termination::Completed => tracing::info!("Stream finished."),
        Termination::Failed(e) => tracing::error!("Error while reading stream: {}", e),
    }

    Ok(DriverReport {
        unary: plain,
        unary_with_metadata: with_metadata,
        stream: outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, SecurityMode};
    use crate::connection::Connection;
    use crate::testing::{FakeApi, ScriptedService, StreamScript, spawn_server};
    use core::time::Duration;
    use tdd_grpc_core::Error;
    use tdd_grpc_core::types::{DEFAULT_AUTH_TOKEN, DEFAULT_STREAM_REQUEST};
    use tonic::Code;

    fn calls() -> CallConfig {
        CallConfig {
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            stream_request: DEFAULT_STREAM_REQUEST.to_string(),
        }
    }

    fn token() -> Option<String> {
        Some(DEFAULT_AUTH_TOKEN.to_string())
    }

    #[tokio::test]
    async fn runs_all_three_calls_in_order() {
        let api = FakeApi::default()
            .reply("hello")
            .reply("hello again")
            .stream(StreamScript::completing(&["a", "b", "c"]));

        let report = run(&api, &calls()).await.unwrap();

        assert_eq!(report.unary.message, "hello");
        assert_eq!(report.unary_with_metadata.message, "hello again");
        assert_eq!(report.stream.received, 3);
        assert!(matches!(report.stream.termination, Termination::Completed));
        assert_eq!(api.seen_authorization(), vec![None, token(), None]);
        assert_eq!(api.stream_requests(), vec![DEFAULT_STREAM_REQUEST]);
    }

    #[tokio::test]
    async fn first_unary_failure_stops_the_run() {
        let api = FakeApi::default()
            .reject(Code::Unavailable, "down")
            .stream(StreamScript::completing(&["a"]));

        let err = run(&api, &calls()).await.unwrap_err();

        assert!(matches!(err, Error::Rpc(ref e) if e.code() == Code::Unavailable));
        assert_eq!(api.tlv1_calls(), 1);
        assert_eq!(api.tlv2_calls(), 0);
    }

    #[tokio::test]
    async fn metadata_call_failure_stops_the_run() {
        let api = FakeApi::default()
            .reply("hello")
            .reject(Code::Unauthenticated, "bad token")
            .stream(StreamScript::completing(&["a"]));

        let err = run(&api, &calls()).await.unwrap_err();

        assert!(matches!(err, Error::Rpc(ref e) if e.code() == Code::Unauthenticated));
        assert_eq!(api.tlv1_calls(), 2);
        assert_eq!(api.tlv2_calls(), 0);
    }

    #[tokio::test]
    async fn stream_open_failure_is_fatal() {
        let api = FakeApi::default()
            .reply("hello")
            .reply("hello")
            .stream(StreamScript::refused(Code::PermissionDenied, "nope"));

        let err = run(&api, &calls()).await.unwrap_err();
        assert!(matches!(err, Error::Rpc(ref e) if e.code() == Code::PermissionDenied));
    }

    #[tokio::test]
    async fn mid_stream_failure_is_reported_not_fatal() {
        let api = FakeApi::default().reply("hello").reply("hello").stream(
            StreamScript::failing(&["1", "2", "3", "4"], Code::InvalidArgument, "Invalid step 5"),
        );

        let report = run(&api, &calls()).await.unwrap();

        assert_eq!(report.stream.received, 4);
        match report.stream.termination {
            Termination::Failed(Error::Rpc(e)) => {
                assert_eq!(e.code(), Code::InvalidArgument);
                assert_eq!(e.message(), "Invalid step 5");
            }
            other => panic!("unexpected termination: {other:?}"),
        }
    }

    async fn connect(target: &str) -> Connection {
        Connection::open(&ConnectionConfig {
            target: target.to_string(),
            security: SecurityMode::Insecure,
            connect_timeout: Duration::from_secs(2),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn end_to_end_over_a_live_connection() {
        let service = ScriptedService::default().stream(StreamScript::completing(&["a", "b", "c"]));
        let log = service.log();
        let server = spawn_server(service).await;
        let connection = connect(&server.target).await;

        let report = run(&connection, &calls()).await.unwrap();
        connection.close();

        assert_eq!(report.unary.message, "hello");
        assert_eq!(report.unary_with_metadata.message, "hello");
        assert_eq!(report.stream.received, 3);
        assert!(matches!(report.stream.termination, Termination::Completed));
        assert_eq!(
            log.calls(),
            vec![("TLV1", None), ("TLV1", token()), ("TLV2", None)]
        );
    }

    #[tokio::test]
    async fn live_mid_stream_failure_keeps_delivered_messages() {
        let service = ScriptedService::default().stream(StreamScript::failing(
            &["a", "b"],
            Code::InvalidArgument,
            "Invalid step 3",
        ));
        let server = spawn_server(service).await;
        let connection = connect(&server.target).await;

        let report = run(&connection, &calls()).await.unwrap();

        assert_eq!(report.stream.received, 2);
        assert!(matches!(
            report.stream.termination,
            Termination::Failed(Error::Rpc(ref e)) if e.code() == Code::InvalidArgument
        ));
    }
}
