// ============================================================================
// Axum Middleware
// ============================================================================
//
// Middleware for request processing:
// - attach_deadline: give every request a time budget for deadline cascading
// - request_logging: log all incoming requests
// - track_metrics: Prometheus request counters and latency histogram
// - verify_token: exchange the bearer credential for a verified principal
//
// ============================================================================

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::context::AppContext;
use crate::error::AppError;
use crate::grpc::Deadline;
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};
use crate::response::{envelope, MSG_INTERNAL_SERVER_ERROR, MSG_UNAUTHORIZED};
use crate::types::{BearerToken, Principal};

/// Attaches the inbound request's time budget, from which every upstream
/// call derives its deadline.
pub async fn attach_deadline(
    State(ctx): State<Arc<AppContext>>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut()
        .insert(Deadline::within(ctx.config.http.request_timeout));
    next.run(req).await
}

/// Request logging middleware
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::debug!(method = %method, path = %path, "incoming request");

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = start.elapsed().as_millis(),
        "request completed"
    );

    response
}

/// Records the request counter and duration histogram, labelled by the
/// matched route pattern to keep cardinality bounded.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;

    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), &route])
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), &route, response.status().as_str()])
        .inc();

    response
}

/// Token Verification Middleware
///
/// Guards routes that need an identity. Reads the bearer credential from the
/// authorization header, exchanges it upstream for the verified user, and
/// places the resulting Principal (plus the raw token) into request
/// extensions for the handler. A missing header short-circuits with 401
/// before any upstream call; an upstream rejection is translated through the
/// status table.
pub async fn verify_token(
    State(ctx): State<Arc<AppContext>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        Some(token) => token.to_string(),
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(envelope(MSG_UNAUTHORIZED, json!({}))),
            )
                .into_response();
        }
    };

    let deadline = req
        .extensions()
        .get::<Deadline>()
        .copied()
        .unwrap_or_default();

    match ctx.auth.verify_token(deadline, &token).await {
        Ok(verified) => {
            let Some(user) = verified.user else {
                tracing::error!("token verification succeeded without a user payload");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(envelope(MSG_INTERNAL_SERVER_ERROR, json!({}))),
                )
                    .into_response();
            };

            req.extensions_mut().insert(Principal::from(user));
            req.extensions_mut().insert(BearerToken(token));
            next.run(req).await
        }
        Err(status) => AppError::upstream(status, &[]).into_response(),
    }
}
