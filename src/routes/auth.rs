// ============================================================================
// Authentication Routes
// ============================================================================
//
// Endpoints:
// - POST /auth/register - Create an account
// - POST /auth/login    - Exchange credentials for a token
// - GET  /auth/profile  - Return the verified principal (protected)
// - POST /auth/logout   - Invalidate the presented token (protected)
//
// ============================================================================

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::grpc::proto::authentication::{LoginRequest, RegisterRequest};
use crate::grpc::Deadline;
use crate::response::{envelope, MSG_OK};
use crate::routes::extractors::{AuthenticatedUser, ForwardedToken};
use crate::types::Principal;
use crate::validation::{FieldErrors, Rules};

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterInput {
    pub const FIELDS: &'static [&'static str] = &["name", "email", "password"];

    fn validate(&self) -> Result<(), FieldErrors> {
        Rules::new(Self::FIELDS)
            .required("name", &self.name)
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginInput {
    pub const FIELDS: &'static [&'static str] = &["email", "password"];

    fn validate(&self) -> Result<(), FieldErrors> {
        Rules::new(Self::FIELDS)
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password)
            .finish()
    }
}

/// POST /auth/register
pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "register body rejected");
        AppError::Validation(FieldErrors::new())
    })?;

    input.validate().map_err(AppError::Validation)?;

    let response = ctx
        .auth
        .register(
            deadline,
            RegisterRequest {
                name: input.name,
                email: input.email,
                password: input.password,
            },
        )
        .await
        .map_err(|status| AppError::upstream(status, RegisterInput::FIELDS))?;

    let user = response.user.map(Principal::from);

    Ok((
        StatusCode::CREATED,
        Json(envelope(
            MSG_OK,
            json!({ "token": response.token, "user": user }),
        )),
    ))
}

/// POST /auth/login
pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "login body rejected");
        AppError::Validation(FieldErrors::new())
    })?;

    input.validate().map_err(AppError::Validation)?;

    let response = ctx
        .auth
        .login(
            deadline,
            LoginRequest {
                email: input.email,
                password: input.password,
            },
        )
        .await
        .map_err(|status| AppError::upstream(status, LoginInput::FIELDS))?;

    let user = response.user.map(Principal::from);

    Ok(Json(envelope(
        MSG_OK,
        json!({ "token": response.token, "user": user }),
    )))
}

/// GET /auth/profile
/// Returns the principal resolved by the verification middleware; no further
/// upstream call is made.
pub async fn profile(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    Json(envelope(MSG_OK, json!({ "user": user })))
}

/// POST /auth/logout
/// Invalidates the exact credential this request authenticated with.
pub async fn logout(
    State(ctx): State<Arc<AppContext>>,
    deadline: Deadline,
    ForwardedToken(token): ForwardedToken,
) -> AppResult<impl IntoResponse> {
    ctx.auth
        .logout(deadline, &token)
        .await
        .map_err(|status| AppError::upstream(status, &[]))?;

    Ok(Json(envelope(MSG_OK, json!({}))))
}
