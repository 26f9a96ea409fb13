// ============================================================================
// Health and Metrics Routes
// ============================================================================
//
// Endpoints:
// - GET /health  - Composite readiness over the three upstream backends
// - GET /metrics - Prometheus metrics
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::grpc::Deadline;
use crate::metrics::{self, SERVICE_HEALTH};
use crate::response::envelope;

/// GET /health
/// Probes every backend in turn, short-circuiting on the first failure.
/// Healthy means all three explicitly report serving.
pub async fn check_all(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
) -> impl IntoResponse {
    if !all_services_healthy(&ctx, deadline).await {
        SERVICE_HEALTH.set(0);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(envelope(
                "Some services are not available!",
                json!({ "status": "degraded" }),
            )),
        );
    }

    SERVICE_HEALTH.set(1);
    (
        StatusCode::OK,
        Json(envelope(
            "All services are healthy!",
            json!({ "status": "healthy" }),
        )),
    )
}

async fn all_services_healthy(ctx: &AppContext, deadline: Deadline) -> bool {
    if let Err(e) = ctx.auth.health(deadline).await {
        tracing::error!(service = "authentication", error = %e, "health probe failed");
        return false;
    }

    if let Err(e) = ctx.video_catalog.health(deadline).await {
        tracing::error!(service = "video-catalog", error = %e, "health probe failed");
        return false;
    }

    if let Err(e) = ctx.upload.health(deadline).await {
        tracing::error!(service = "upload", error = %e, "health probe failed");
        return false;
    }

    true
}

/// GET /metrics
/// Prometheus metrics endpoint
pub async fn metrics() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(metrics_data) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics_data,
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to gather metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", "text/plain")],
                "Internal Server Error".to_string(),
            )
        }
    }
}
