//! Test doubles for the client: an in-memory [`TddApi`] fake and a real
//! tonic server bound to an ephemeral local port.

use super::api::{ResponseStream, TddApi};
use core::sync::atomic::{AtomicUsize, Ordering};
use futures::{StreamExt, stream};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tdd_grpc_core::proto::{
    RequestForm, ResponseSingle,
    tdd_v1_server::{TddV1, TddV1Server},
};
use tdd_grpc_core::types::AUTHORIZATION_KEY;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::metadata::MetadataMap;
use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};

fn response(message: &str) -> ResponseSingle {
    ResponseSingle {
        message: message.to_string(),
    }
}

fn authorization(metadata: &MetadataMap) -> Option<String> {
    metadata
        .get(AUTHORIZATION_KEY)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// What a `TLV2` call does: refuse to open, or emit `messages` and then end
/// cleanly or with `failure`.
#[derive(Debug, Clone, Default)]
pub(crate) struct StreamScript {
    refusal: Option<(Code, String)>,
    messages: Vec<String>,
    failure: Option<(Code, String)>,
}

impl StreamScript {
    pub(crate) fn completing(messages: &[&str]) -> Self {
        Self {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing(messages: &[&str], code: Code, reason: &str) -> Self {
        Self {
            failure: Some((code, reason.to_string())),
            ..Self::completing(messages)
        }
    }

    pub(crate) fn refused(code: Code, reason: &str) -> Self {
        Self {
            refusal: Some((code, reason.to_string())),
            ..Self::default()
        }
    }

    fn play(&self) -> Result<ResponseStream, Status> {
        if let Some((code, reason)) = &self.refusal {
            return Err(Status::new(*code, reason.clone()));
        }
        let mut items: Vec<Result<ResponseSingle, Status>> =
            self.messages.iter().map(|m| Ok(response(m))).collect();
        if let Some((code, reason)) = &self.failure {
            items.push(Err(Status::new(*code, reason.clone())));
        }
        Ok(stream::iter(items).boxed())
    }
}

/// Scripted in-memory implementation of [`TddApi`].
#[derive(Default)]
pub(crate) struct FakeApi {
    replies: Mutex<VecDeque<Result<String, (Code, String)>>>,
    stream: StreamScript,
    tlv1_calls: AtomicUsize,
    tlv2_calls: AtomicUsize,
    authorization: Mutex<Vec<Option<String>>>,
    stream_requests: Mutex<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn reply(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(message.to_string()));
        self
    }

    pub(crate) fn reject(self, code: Code, reason: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err((code, reason.to_string())));
        self
    }

    pub(crate) fn stream(self, script: StreamScript) -> Self {
        Self {
            stream: script,
            ..self
        }
    }

    pub(crate) fn tlv1_calls(&self) -> usize {
        self.tlv1_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn tlv2_calls(&self) -> usize {
        self.tlv2_calls.load(Ordering::SeqCst)
    }

    /// `authorization` value observed on each call, in call order.
    pub(crate) fn seen_authorization(&self) -> Vec<Option<String>> {
        self.authorization.lock().unwrap().clone()
    }

    pub(crate) fn stream_requests(&self) -> Vec<String> {
        self.stream_requests.lock().unwrap().clone()
    }
}

#[tonic::async_trait]
impl TddApi for FakeApi {
    async fn tlv1(&self, request: Request<()>) -> Result<ResponseSingle, Status> {
        self.tlv1_calls.fetch_add(1, Ordering::SeqCst);
        self.authorization
            .lock()
            .unwrap()
            .push(authorization(request.metadata()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(message)) => Ok(response(&message)),
            Some(Err((code, reason))) => Err(Status::new(code, reason)),
            None => Err(Status::internal("no scripted reply")),
        }
    }

    async fn tlv2(&self, request: Request<RequestForm>) -> Result<ResponseStream, Status> {
        self.tlv2_calls.fetch_add(1, Ordering::SeqCst);
        self.authorization
            .lock()
            .unwrap()
            .push(authorization(request.metadata()));
        self.stream_requests
            .lock()
            .unwrap()
            .push(request.into_inner().req);
        self.stream.play()
    }
}

/// Calls observed by a [`ScriptedService`].
#[derive(Debug, Default)]
pub(crate) struct CallLog {
    calls: Mutex<Vec<(&'static str, Option<String>)>>,
}

impl CallLog {
    /// `(operation, authorization)` per call, in arrival order.
    pub(crate) fn calls(&self) -> Vec<(&'static str, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, metadata: &MetadataMap) {
        self.calls
            .lock()
            .unwrap()
            .push((operation, authorization(metadata)));
    }
}

/// `Tdd_V1` server answering from a script, served over real HTTP/2.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedService {
    greeting: String,
    stream: StreamScript,
    log: Arc<CallLog>,
}

impl Default for ScriptedService {
    fn default() -> Self {
        Self {
            greeting: "hello".to_string(),
            stream: StreamScript::default(),
            log: Arc::default(),
        }
    }
}

impl ScriptedService {
    pub(crate) fn stream(self, script: StreamScript) -> Self {
        Self {
            stream: script,
            ..self
        }
    }

    pub(crate) fn log(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }
}

#[tonic::async_trait]
impl TddV1 for ScriptedService {
    async fn tlv1(&self, request: Request<()>) -> Result<Response<ResponseSingle>, Status> {
        self.log.record("TLV1", request.metadata());
        Ok(Response::new(response(&self.greeting)))
    }

    type TLV2Stream = ResponseStream;

    async fn tlv2(
        &self,
        request: Request<RequestForm>,
    ) -> Result<Response<Self::TLV2Stream>, Status> {
        self.log.record("TLV2", request.metadata());
        self.stream.play().map(Response::new)
    }
}

/// A running [`ScriptedService`]; shut down when dropped.
pub(crate) struct TestServer {
    pub(crate) target: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub(crate) async fn spawn_server(service: ScriptedService) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(
        Server::builder()
            .add_service(TddV1Server::new(service))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                let _ = rx.await;
            }),
    );

    TestServer {
        target: format!("http://{addr}"),
        shutdown: Some(tx),
    }
}

/// Target on which nothing is listening.
pub(crate) fn closed_port_target() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
