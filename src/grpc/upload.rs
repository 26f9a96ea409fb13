//! Client for the upload backend.

use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::{metadata::MetadataValue, Request, Status};

use super::proto::health::health_client::HealthClient;
use super::proto::upload::{
    upload_service_client::UploadServiceClient, CreatePresignedUrlRequest,
    CreatePresignedUrlResponse, UploadedWebhookRequest, UploadedWebhookResponse,
};
use super::{call_timeout, check_health, connect, Deadline, HealthError};
use crate::config::UpstreamConfig;
use crate::response::HEADER_USER_ID;

/// Capability surface of the upload backend.
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn create_presigned_url(
        &self,
        deadline: Deadline,
    ) -> Result<CreatePresignedUrlResponse, Status>;

    /// Registers an uploaded video on behalf of `user_id`, forwarded as the
    /// x-user-id call metadata.
    async fn uploaded_webhook(
        &self,
        deadline: Deadline,
        request: UploadedWebhookRequest,
        user_id: &str,
    ) -> Result<UploadedWebhookResponse, Status>;

    async fn health(&self, deadline: Deadline) -> Result<(), HealthError>;
}

/// gRPC-backed client for the upload backend.
pub struct UploadClient {
    stub: UploadServiceClient<Channel>,
    health: HealthClient<Channel>,
    timeout: Duration,
}

impl UploadClient {
    /// Connects to the backend. Failure is fatal to startup.
    pub async fn connect(config: &UpstreamConfig) -> Result<Self, tonic::transport::Error> {
        let channel = connect(config).await?;

        Ok(Self {
            stub: UploadServiceClient::new(channel.clone()),
            health: HealthClient::new(channel),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl UploadService for UploadClient {
    async fn create_presigned_url(
        &self,
        deadline: Deadline,
    ) -> Result<CreatePresignedUrlResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let mut req = Request::new(CreatePresignedUrlRequest {});
        req.set_timeout(timeout);

        let response = tokio::time::timeout(timeout, self.stub.clone().create_presigned_url(req))
            .await
            .map_err(|_| Status::deadline_exceeded("upload.CreatePresignedUrl timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), "upload.CreatePresignedUrl failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn uploaded_webhook(
        &self,
        deadline: Deadline,
        request: UploadedWebhookRequest,
        user_id: &str,
    ) -> Result<UploadedWebhookResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let mut req = Request::new(request);
        req.set_timeout(timeout);

        let value = MetadataValue::try_from(user_id)
            .map_err(|_| Status::internal("user id is not valid metadata"))?;
        req.metadata_mut().insert(HEADER_USER_ID, value);

        let response = tokio::time::timeout(timeout, self.stub.clone().uploaded_webhook(req))
            .await
            .map_err(|_| Status::deadline_exceeded("upload.UploadedWebhook timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), "upload.UploadedWebhook failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn health(&self, deadline: Deadline) -> Result<(), HealthError> {
        check_health(&self.health, "upload", call_timeout(self.timeout, deadline)).await
    }
}
