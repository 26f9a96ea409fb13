// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: router assembly and middleware stack
// - auth.rs: authentication endpoints
// - videos.rs: catalog and upload endpoints
// - health.rs: composite health check and metrics endpoints
// - extractors.rs: custom Axum extractors (principal, token, deadline)
// - middleware.rs: deadline, logging, metrics, token verification
//
// ============================================================================

mod auth;
mod extractors;
mod health;
mod middleware;
mod videos;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(ctx: Arc<AppContext>) -> Router {
    // Routes that require a verified principal.
    let protected = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/auth/logout", post(auth::logout))
        .route("/videos/upload/presigned-url", post(videos::create_presigned_url))
        .route("/videos/upload/webhook", post(videos::uploaded_webhook))
        .route_layer(axum::middleware::from_fn_with_state(
            ctx.clone(),
            middleware::verify_token,
        ));

    Router::new()
        // Health and monitoring
        .route("/health", get(health::check_all))
        .route("/metrics", get(health::metrics))
        // Public authentication endpoints
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Public catalog endpoints
        .route("/videos", get(videos::find_all))
        .route("/videos/:id", get(videos::find_by_id))
        .merge(protected)
        // Apply middleware (first layer listed runs first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(axum::middleware::from_fn(middleware::track_metrics))
                // Must run before verify_token so upstream calls can cascade
                // off the request budget.
                .layer(axum::middleware::from_fn_with_state(
                    ctx.clone(),
                    middleware::attach_deadline,
                ))
                .into_inner(),
        )
        .with_state(ctx)
}
