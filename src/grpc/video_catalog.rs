//! Client for the video catalog backend.

use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::{Request, Status};

use super::proto::health::health_client::HealthClient;
use super::proto::video_catalog::{
    video_catalog_service_client::VideoCatalogServiceClient, FindAllRequest, FindAllResponse,
    FindByIdRequest, FindByIdResponse,
};
use super::{call_timeout, check_health, connect, Deadline, HealthError};
use crate::config::UpstreamConfig;

/// Capability surface of the video catalog backend.
#[async_trait]
pub trait VideoCatalogService: Send + Sync {
    async fn find_all(&self, deadline: Deadline) -> Result<FindAllResponse, Status>;

    async fn find_by_id(&self, deadline: Deadline, id: i32) -> Result<FindByIdResponse, Status>;

    async fn health(&self, deadline: Deadline) -> Result<(), HealthError>;
}

/// gRPC-backed client for the video catalog backend.
pub struct CatalogClient {
    stub: VideoCatalogServiceClient<Channel>,
    health: HealthClient<Channel>,
    timeout: Duration,
}

impl CatalogClient {
    /// Connects to the backend. Failure is fatal to startup.
    pub async fn connect(config: &UpstreamConfig) -> Result<Self, tonic::transport::Error> {
        let channel = connect(config).await?;

        Ok(Self {
            stub: VideoCatalogServiceClient::new(channel.clone()),
            health: HealthClient::new(channel),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl VideoCatalogService for CatalogClient {
    async fn find_all(&self, deadline: Deadline) -> Result<FindAllResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let mut req = Request::new(FindAllRequest {});
        req.set_timeout(timeout);

        let response = tokio::time::timeout(timeout, self.stub.clone().find_all(req))
            .await
            .map_err(|_| Status::deadline_exceeded("video-catalog.FindAll timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), "video-catalog.FindAll failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn find_by_id(&self, deadline: Deadline, id: i32) -> Result<FindByIdResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let mut req = Request::new(FindByIdRequest { id });
        req.set_timeout(timeout);

        let response = tokio::time::timeout(timeout, self.stub.clone().find_by_id(req))
            .await
            .map_err(|_| Status::deadline_exceeded("video-catalog.FindById timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), video_id = id, "video-catalog.FindById failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn health(&self, deadline: Deadline) -> Result<(), HealthError> {
        check_health(
            &self.health,
            "video-catalog",
            call_timeout(self.timeout, deadline),
        )
        .await
    }
}
