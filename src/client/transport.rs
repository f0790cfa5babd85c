//! The seam between [`ProfileClient`](crate::ProfileClient) and the wire.
//!
//! [`ProfileTransport`] is the set of remote calls the client needs.
//! [`GrpcTransport`] implements it over a tonic channel; tests and embedders
//! can plug in their own implementation through
//! [`ProfileClient::with_transport`](crate::ProfileClient::with_transport).

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Request, Status};

use super::config::ClientConfig;
use crate::proto::{
    ProfileContactRequest, ProfileCreateRequest, ProfileIdRequest, ProfileObject,
    ProfileServiceClient,
};

/// Remote operations offered by the profile service.
///
/// Requests arrive with the client's metadata and `grpc-timeout` already set.
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait ProfileTransport: Send + Sync {
    async fn get_by_id(&self, request: Request<ProfileIdRequest>) -> Result<ProfileObject, Status>;

    async fn get_by_contact(
        &self,
        request: Request<ProfileContactRequest>,
    ) -> Result<ProfileObject, Status>;

    async fn create(&self, request: Request<ProfileCreateRequest>) -> Result<ProfileObject, Status>;

    /// Release the underlying connection. Called once, by `ProfileClient::close`.
    fn close(&self) {}
}

/// [`ProfileTransport`] over a tonic [`Channel`].
///
/// Each call clones the stub, which shares the channel; the channel
/// multiplexes concurrent calls over one HTTP/2 connection.
#[derive(Debug)]
pub struct GrpcTransport {
    stub: Mutex<Option<ProfileServiceClient<Channel>>>,
}

impl GrpcTransport {
    /// Bind a stub to `channel` with the message-size limits from `config`.
    pub fn new(channel: Channel, config: &ClientConfig) -> Self {
        let mut stub = ProfileServiceClient::new(channel)
            .max_decoding_message_size(config.max_decoding_message_size);
        if let Some(limit) = config.max_encoding_message_size {
            stub = stub.max_encoding_message_size(limit);
        }
        Self {
            stub: Mutex::new(Some(stub)),
        }
    }

    fn stub(&self) -> Result<ProfileServiceClient<Channel>, Status> {
        self.stub
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Status::unavailable("connection closed"))
    }
}

#[async_trait]
impl ProfileTransport for GrpcTransport {
    async fn get_by_id(&self, request: Request<ProfileIdRequest>) -> Result<ProfileObject, Status> {
        let response = self.stub()?.get_by_id(request).await?;
        Ok(response.into_inner())
    }

    async fn get_by_contact(
        &self,
        request: Request<ProfileContactRequest>,
    ) -> Result<ProfileObject, Status> {
        let response = self.stub()?.get_by_contact(request).await?;
        Ok(response.into_inner())
    }

    async fn create(&self, request: Request<ProfileCreateRequest>) -> Result<ProfileObject, Status> {
        let response = self.stub()?.create(request).await?;
        Ok(response.into_inner())
    }

    fn close(&self) {
        // Dropping the last stub drops the channel, which shuts the connection down.
        self.stub
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_transport_reports_unavailable() {
        let channel = tonic::transport::Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let transport = GrpcTransport::new(channel, &ClientConfig::default());
        transport.close();

        let status = transport
            .get_by_id(Request::new(ProfileIdRequest { id: "p1".into() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unavailable);
        assert_eq!(status.message(), "connection closed");
    }
}
