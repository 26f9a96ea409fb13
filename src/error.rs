// ============================================================================
// Error Translation
// ============================================================================
//
// Bridges the three error vocabularies the gateway deals with:
// - upstream gRPC status codes, mapped onto HTTP statuses by a total table
// - local validation failures, carrying a per-field error map
// - programming errors (e.g. a protected handler without a principal)
//
// This module and the local validation engine are the only places allowed to
// shape a client-visible message. Upstream error text is only interpreted on
// the 400 path, as a structured field-error payload, and never echoed raw.
//
// ============================================================================

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;
use tonic::Code;

use crate::response::{envelope, status_message, MSG_BAD_REQUEST, MSG_INTERNAL_SERVER_ERROR};
use crate::validation::{empty_field_errors, FieldErrors};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// An upstream call failed; translated through the status table. The
    /// shape lists the fields of the route's validation payload so a 400 can
    /// be expanded into a complete field-error map.
    #[error("upstream call failed: {status}")]
    Upstream {
        status: tonic::Status,
        shape: &'static [&'static str],
    },

    /// Local validation rejected the request before any upstream call.
    #[error("request validation failed")]
    Validation(FieldErrors),

    /// A broken internal invariant. Fatal to the request, never silently
    /// ignored.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upstream(status: tonic::Status, shape: &'static [&'static str]) -> Self {
        AppError::Upstream { status, shape }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Upstream { status, shape } => {
                let (http, body) = translate(&status, shape);
                (http, Json(body)).into_response()
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(envelope(MSG_BAD_REQUEST, json!({ "errors": errors }))),
            )
                .into_response(),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed on an internal invariant");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(envelope(MSG_INTERNAL_SERVER_ERROR, json!({}))),
                )
                    .into_response()
            }
        }
    }
}

/// Total mapping from the upstream status vocabulary to HTTP statuses.
/// Unrecognized codes fail closed to 500.
pub fn grpc_to_http(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an upstream failure to an HTTP status and response body. Only a
/// resolved 400 carries field errors; the upstream message is parsed as a
/// JSON field-error payload and normalized onto the declared shape.
pub fn translate(
    status: &tonic::Status,
    shape: &'static [&'static str],
) -> (StatusCode, serde_json::Value) {
    let http = grpc_to_http(status.code());

    tracing::error!(
        code = ?status.code(),
        http = %http.as_u16(),
        "translating upstream failure"
    );

    let data = if http == StatusCode::BAD_REQUEST {
        json!({ "errors": field_errors_from_message(status.message(), shape) })
    } else {
        json!({})
    };

    (http, envelope(status_message(http), data))
}

/// Parses an upstream validation payload and normalizes it onto the declared
/// field shape: every declared field present, missing fields get an empty
/// list, unknown fields are dropped. An unparseable payload yields the empty
/// shape.
fn field_errors_from_message(raw: &str, shape: &'static [&'static str]) -> FieldErrors {
    let parsed: HashMap<String, Option<Vec<String>>> =
        serde_json::from_str(raw).unwrap_or_default();

    let mut errors = empty_field_errors(shape);
    for (field, messages) in errors.iter_mut() {
        if let Some(Some(upstream)) = parsed.get(*field) {
            *messages = upstream.clone();
        }
    }

    errors
}
