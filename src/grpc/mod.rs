// ============================================================================
// Upstream gRPC Clients
// ============================================================================
//
// One client per backend, each wrapping a single long-lived channel created
// at startup. Every call derives a deadline from the backend's configured
// timeout, bounded further by the inbound request's remaining budget.
// Failures are logged and propagated as tonic::Status unchanged; the error
// translator is the only place that interprets them.
//
// ============================================================================

pub mod authentication;
pub mod upload;
pub mod video_catalog;

use std::time::{Duration, Instant};
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};

use crate::config::UpstreamConfig;
use proto::health::health_client::HealthClient;
use proto::health::health_check_response::ServingStatus;
use proto::health::HealthCheckRequest;

// Include the protobuf generated code.
pub mod proto {
    pub mod authentication {
        tonic::include_proto!("reelgate.authentication.v1");
    }
    pub mod upload {
        tonic::include_proto!("reelgate.upload.v1");
    }
    pub mod video_catalog {
        tonic::include_proto!("reelgate.video_catalog.v1");
    }
    pub mod health {
        tonic::include_proto!("grpc.health.v1");
    }
}

/// The inbound request's remaining time budget. Attached to each request by
/// middleware and threaded into every upstream call so deadlines cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No inbound budget; calls fall back to the configured timeout alone.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn within(budget: Duration) -> Self {
        Self(Some(Instant::now() + budget))
    }

    /// Remaining budget, saturating at zero once expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(Instant::now()))
    }
}

/// Deadline for one outbound call: the configured per-call timeout, bounded
/// by whatever is left of the inbound request's budget.
pub(crate) fn call_timeout(configured: Duration, deadline: Deadline) -> Duration {
    match deadline.remaining() {
        Some(budget) => budget.min(configured),
        None => configured,
    }
}

/// Outcome of a single upstream health probe. Only an explicit SERVING
/// report passes.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("health check transport failure: {0}")]
    Transport(#[from] tonic::Status),
    #[error("upstream reported it is not serving")]
    NotServing,
}

/// Establishes the shared channel for one backend. Failure here is fatal to
/// startup; there is no lazy reconnect.
pub(crate) async fn connect(config: &UpstreamConfig) -> Result<Channel, tonic::transport::Error> {
    let channel = Endpoint::from_shared(config.url.clone())?.connect().await?;

    tracing::info!(service = config.name, url = %config.url, "gRPC client connected");

    Ok(channel)
}

/// Shared probe against the standard gRPC health service.
pub(crate) async fn check_health(
    health: &HealthClient<Channel>,
    name: &'static str,
    timeout: Duration,
) -> Result<(), HealthError> {
    let mut request = tonic::Request::new(HealthCheckRequest {
        service: String::new(),
    });
    request.set_timeout(timeout);

    let response = tokio::time::timeout(timeout, health.clone().check(request))
        .await
        .map_err(|_| tonic::Status::deadline_exceeded(format!("{name} health check timed out")))?
        .map_err(|status| {
            tracing::error!(service = name, code = ?status.code(), "health check failed");
            status
        })?;

    if response.into_inner().status() == ServingStatus::Serving {
        Ok(())
    } else {
        tracing::error!(service = name, "health check reported not serving");
        Err(HealthError::NotServing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_timeout_without_budget_uses_the_configured_timeout() {
        let configured = Duration::from_secs(5);
        assert_eq!(call_timeout(configured, Deadline::none()), configured);
    }

    #[test]
    fn call_timeout_is_bounded_by_a_smaller_budget() {
        let configured = Duration::from_secs(5);
        let bounded = call_timeout(configured, Deadline::within(Duration::from_millis(50)));
        assert!(bounded <= Duration::from_millis(50));
    }

    #[test]
    fn call_timeout_ignores_a_larger_budget() {
        let configured = Duration::from_secs(5);
        let bounded = call_timeout(configured, Deadline::within(Duration::from_secs(3600)));
        assert_eq!(bounded, configured);
    }

    #[test]
    fn call_timeout_with_equal_budget_stays_at_the_configured_timeout() {
        let configured = Duration::from_secs(5);
        let bounded = call_timeout(configured, Deadline::within(configured));
        assert!(bounded <= configured);
        assert!(bounded >= configured - Duration::from_millis(50));
    }

    #[test]
    fn expired_deadlines_saturate_to_zero() {
        let deadline = Deadline::within(Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
        assert_eq!(call_timeout(Duration::from_secs(5), deadline), Duration::ZERO);
    }
}
