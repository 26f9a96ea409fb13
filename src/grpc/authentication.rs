//! Client for the authentication backend.

use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::{metadata::MetadataValue, Request, Status};

use super::proto::authentication::{
    authentication_service_client::AuthenticationServiceClient, LoginRequest, LoginResponse,
    LogoutRequest, LogoutResponse, RegisterRequest, RegisterResponse, VerifyTokenRequest,
    VerifyTokenResponse,
};
use super::proto::health::health_client::HealthClient;
use super::{call_timeout, check_health, connect, Deadline, HealthError};
use crate::config::UpstreamConfig;
use crate::response::HEADER_AUTHORIZATION;

/// Capability surface of the authentication backend. Handlers and middleware
/// depend on this trait, so tests can substitute a double for the gRPC-backed
/// client.
#[async_trait]
pub trait AuthenticationService: Send + Sync {
    async fn register(
        &self,
        deadline: Deadline,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, Status>;

    async fn login(&self, deadline: Deadline, request: LoginRequest)
        -> Result<LoginResponse, Status>;

    /// Exchanges the bearer credential (forwarded as call metadata) for the
    /// verified user it belongs to.
    async fn verify_token(
        &self,
        deadline: Deadline,
        token: &str,
    ) -> Result<VerifyTokenResponse, Status>;

    /// Invalidates the exact credential carried in call metadata.
    async fn logout(&self, deadline: Deadline, token: &str) -> Result<LogoutResponse, Status>;

    async fn health(&self, deadline: Deadline) -> Result<(), HealthError>;
}

/// gRPC-backed client for the authentication backend, sharing one channel
/// across all in-flight requests.
pub struct AuthClient {
    stub: AuthenticationServiceClient<Channel>,
    health: HealthClient<Channel>,
    timeout: Duration,
}

impl AuthClient {
    /// Connects to the backend. Failure is fatal to startup.
    pub async fn connect(config: &UpstreamConfig) -> Result<Self, tonic::transport::Error> {
        let channel = connect(config).await?;

        Ok(Self {
            stub: AuthenticationServiceClient::new(channel.clone()),
            health: HealthClient::new(channel),
            timeout: config.timeout,
        })
    }

    fn bearer_request<T>(message: T, token: &str, timeout: Duration) -> Result<Request<T>, Status> {
        let mut request = Request::new(message);
        request.set_timeout(timeout);

        let value = MetadataValue::try_from(token)
            .map_err(|_| Status::unauthenticated("credential is not valid metadata"))?;
        request.metadata_mut().insert(HEADER_AUTHORIZATION, value);

        Ok(request)
    }
}

#[async_trait]
impl AuthenticationService for AuthClient {
    async fn register(
        &self,
        deadline: Deadline,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let mut req = Request::new(request);
        req.set_timeout(timeout);

        let response = tokio::time::timeout(timeout, self.stub.clone().register(req))
            .await
            .map_err(|_| Status::deadline_exceeded("authentication.Register timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), "authentication.Register failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn login(
        &self,
        deadline: Deadline,
        request: LoginRequest,
    ) -> Result<LoginResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let mut req = Request::new(request);
        req.set_timeout(timeout);

        let response = tokio::time::timeout(timeout, self.stub.clone().login(req))
            .await
            .map_err(|_| Status::deadline_exceeded("authentication.Login timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), "authentication.Login failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn verify_token(
        &self,
        deadline: Deadline,
        token: &str,
    ) -> Result<VerifyTokenResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let req = Self::bearer_request(VerifyTokenRequest {}, token, timeout)?;

        let response = tokio::time::timeout(timeout, self.stub.clone().verify_token(req))
            .await
            .map_err(|_| Status::deadline_exceeded("authentication.VerifyToken timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), "authentication.VerifyToken failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn logout(&self, deadline: Deadline, token: &str) -> Result<LogoutResponse, Status> {
        let timeout = call_timeout(self.timeout, deadline);
        let req = Self::bearer_request(LogoutRequest {}, token, timeout)?;

        let response = tokio::time::timeout(timeout, self.stub.clone().logout(req))
            .await
            .map_err(|_| Status::deadline_exceeded("authentication.Logout timed out"))?
            .map_err(|status| {
                tracing::error!(code = ?status.code(), "authentication.Logout failed");
                status
            })?;

        Ok(response.into_inner())
    }

    async fn health(&self, deadline: Deadline) -> Result<(), HealthError> {
        check_health(
            &self.health,
            "authentication",
            call_timeout(self.timeout, deadline),
        )
        .await
    }
}
