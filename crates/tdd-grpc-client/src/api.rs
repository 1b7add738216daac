//! The `Tdd_V1` operations as a capability set.
//!
//! [`TddApi`] has one method per remote operation. [`Connection`] implements
//! it over the generated tonic stub; tests substitute in-memory fakes.

use super::connection::Connection;
use futures::{StreamExt, stream::BoxStream};
use tdd_grpc_core::proto::{RequestForm, ResponseSingle};
use tonic::{Request, Status};

/// Server stream returned by `TLV2`, in the order the server produced it.
pub type ResponseStream = BoxStream<'static, Result<ResponseSingle, Status>>;

#[tonic::async_trait]
pub trait TddApi: Send + Sync {
    /// `TLV1`: empty request, single response.
    async fn tlv1(&self, request: Request<()>) -> Result<ResponseSingle, Status>;

    /// `TLV2`: opens a server stream of responses.
    async fn tlv2(&self, request: Request<RequestForm>) -> Result<ResponseStream, Status>;
}

#[tonic::async_trait]
impl TddApi for Connection {
    async fn tlv1(&self, request: Request<()>) -> Result<ResponseSingle, Status> {
        let mut client = self.client();
        Ok(client.tlv1(request).await?.into_inner())
    }

    async fn tlv2(&self, request: Request<RequestForm>) -> Result<ResponseStream, Status> {
        let mut client = self.client();
        Ok(client.tlv2(request).await?.into_inner().boxed())
    }
}
