
use serde_json::Value;

use test_utils::{spawn_app, Backends, MockHealth};

#[tokio::test]
async fn health_reports_healthy_when_every_backend_is_serving() {
    let app = spawn_app(Backends::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "All services are healthy!");
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn health_reports_degraded_when_one_backend_is_not_serving() {
    let mut backends = Backends::default();
    backends.upload_health = MockHealth::not_serving();
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Some services are not available!");
    assert_eq!(body["data"]["status"], "degraded");
}

#[tokio::test]
async fn health_short_circuits_after_the_first_failing_probe() {
    let mut backends = Backends::default();
    backends.auth_health = MockHealth::not_serving();
    let auth_probes = backends.auth_health.calls.clone();
    let catalog_probes = backends.catalog_health.calls.clone();
    let upload_probes = backends.upload_health.calls.clone();
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
    assert_eq!(auth_probes.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(catalog_probes.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(upload_probes.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn metrics_endpoint_exposes_request_counters() {
    let app = spawn_app(Backends::default()).await;
    let client = reqwest::Client::new();

    // Generate at least one tracked request before scraping.
    client
        .get(format!("{}/videos", app.address))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.unwrap();
    assert!(body.contains("reelgate_requests_total"));
}
