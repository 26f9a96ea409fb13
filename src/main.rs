use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use reelgate::config::Config;
use reelgate::context::AppContext;
use reelgate::grpc::authentication::AuthClient;
use reelgate::grpc::upload::UploadClient;
use reelgate::grpc::video_catalog::CatalogClient;
use reelgate::routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    // Every backend connection is established up front; a backend we cannot
    // reach at startup is fatal.
    let auth = AuthClient::connect(&config.authentication)
        .await
        .context("failed to connect to the authentication service")?;
    let upload = UploadClient::connect(&config.upload)
        .await
        .context("failed to connect to the upload service")?;
    let video_catalog = CatalogClient::connect(&config.video_catalog)
        .await
        .context("failed to connect to the video catalog service")?;

    let ctx = Arc::new(AppContext::new(
        config.clone(),
        Arc::new(auth),
        Arc::new(upload),
        Arc::new(video_catalog),
    ));

    probe_backends(&ctx).await;

    let app = routes::create_router(ctx);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "API gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("API gateway stopped");

    Ok(())
}

/// One health probe per backend at startup. A failing probe is logged but
/// not fatal; the backend may come up later and /health keeps watching.
async fn probe_backends(ctx: &AppContext) {
    use reelgate::grpc::Deadline;

    for (name, result) in [
        ("authentication", ctx.auth.health(Deadline::none()).await),
        ("video-catalog", ctx.video_catalog.health(Deadline::none()).await),
        ("upload", ctx.upload.health(Deadline::none()).await),
    ] {
        match result {
            Ok(()) => tracing::info!(service = name, "backend is serving"),
            Err(e) => tracing::warn!(service = name, error = %e, "backend health probe failed"),
        }
    }
}

/// Resolves on SIGINT or SIGTERM so in-flight requests can drain before the
/// process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
