
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use tonic::Status;

use test_utils::{spawn_app, Backends};

#[tokio::test]
async fn register_returns_201_with_token_and_user() {
    let app = spawn_app(Backends::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/register", app.address))
        .json(&json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "s3cret"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Success");
    assert_eq!(body["data"]["token"], "fresh-token");
    assert_eq!(body["data"]["user"]["id"], 42);
    assert_eq!(body["data"]["user"]["email"], "jane@example.com");
}

#[tokio::test]
async fn register_with_empty_fields_returns_400_with_all_field_errors() {
    let app = spawn_app(Backends::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/register", app.address))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Bad Request");

    let errors = body["data"]["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
    for field in ["name", "email", "password"] {
        let messages = errors[field].as_array().unwrap();
        assert!(!messages.is_empty(), "expected errors for {field}");
    }
    assert_eq!(errors["name"][0], "name is required");
}

#[tokio::test]
async fn register_with_malformed_body_returns_400_with_empty_errors() {
    let app = spawn_app(Backends::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/register", app.address))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Bad Request");
    assert_eq!(body["data"]["errors"], json!({}));
}

#[tokio::test]
async fn register_normalizes_upstream_field_errors_onto_the_full_shape() {
    let mut backends = Backends::default();
    backends.auth.register = Err(Status::invalid_argument(
        r#"{"email":["email is already taken"]}"#,
    ));
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/register", app.address))
        .json(&json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "s3cret"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    let errors = body["data"]["errors"].as_object().unwrap();
    // Every declared field is present; only the reported one carries messages.
    assert_eq!(errors.len(), 3);
    assert_eq!(errors["email"][0], "email is already taken");
    assert_eq!(errors["name"], json!([]));
    assert_eq!(errors["password"], json!([]));
}

#[tokio::test]
async fn register_with_unparseable_upstream_message_empties_every_field() {
    let mut backends = Backends::default();
    backends.auth.register = Err(Status::invalid_argument("email already taken"));
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/register", app.address))
        .json(&json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "s3cret"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    let errors = body["data"]["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
    for field in ["name", "email", "password"] {
        assert_eq!(errors[field], json!([]));
    }
    // The raw upstream text never leaks into the response.
    assert_eq!(body["message"], "Bad Request");
}

#[tokio::test]
async fn register_conflict_maps_to_409_without_upstream_text() {
    let mut backends = Backends::default();
    backends.auth.register = Err(Status::already_exists("duplicate key on users.email"));
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/register", app.address))
        .json(&json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "s3cret"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Conflict");
    assert!(!body.to_string().contains("duplicate key"));
}

#[tokio::test]
async fn login_returns_200_with_token() {
    let app = spawn_app(Backends::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/login", app.address))
        .json(&json!({
            "email": "jane@example.com",
            "password": "s3cret"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Success");
    assert_eq!(body["data"]["token"], "fresh-token");
}

#[tokio::test]
async fn login_rejects_a_malformed_email_locally() {
    let app = spawn_app(Backends::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/login", app.address))
        .json(&json!({
            "email": "not-an-email",
            "password": "s3cret"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    let errors = body["data"]["errors"].as_object().unwrap();
    assert_eq!(errors["email"][0], "email must be an email");
    assert_eq!(errors["password"], json!([]));
}

#[tokio::test]
async fn profile_without_authorization_header_returns_401_without_upstream_call() {
    let backends = Backends::default();
    let verify_calls = backends.auth.verify_calls.clone();
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/auth/profile", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Unauthorized");
    assert_eq!(verify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn profile_with_empty_authorization_header_returns_401_without_upstream_call() {
    let backends = Backends::default();
    let verify_calls = backends.auth.verify_calls.clone();
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/auth/profile", app.address))
        .header("authorization", "")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(verify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn profile_forwards_the_header_and_returns_the_verified_user() {
    let backends = Backends::default();
    let seen = backends.auth.seen_authorization.clone();
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/auth/profile", app.address))
        .header("authorization", "Bearer abc123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["user"]["id"], 42);
    assert_eq!(body["data"]["user"]["name"], "Jane Doe");
    assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer abc123"));
}

#[tokio::test]
async fn profile_with_rejected_token_returns_401_not_500() {
    let mut backends = Backends::default();
    backends.auth.verify = Err(Status::unauthenticated("token expired"));
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/auth/profile", app.address))
        .header("authorization", "Bearer stale")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn logout_forwards_the_authenticated_token() {
    let backends = Backends::default();
    let seen = backends.auth.seen_authorization.clone();
    let app = spawn_app(backends).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/logout", app.address))
        .header("authorization", "Bearer abc123")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Success");
    assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer abc123"));
}
