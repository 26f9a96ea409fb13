// ============================================================================
// Axum Extractors
// ============================================================================
//
// Custom extractors for Axum routes:
// - AuthenticatedUser: the Principal placed in request extensions by the
//   token-verification middleware
// - ForwardedToken: the raw bearer credential, for calls that must act on
//   the same token (logout)
// - Deadline: the inbound request's remaining time budget
//
// ============================================================================

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::convert::Infallible;

use crate::grpc::Deadline;
use crate::response::{envelope, MSG_INTERNAL_SERVER_ERROR};
use crate::types::{BearerToken, Principal};

/// The verified principal for this request.
///
/// Only routes behind the token-verification middleware can extract this;
/// reaching a handler without one is a programming error in the route table
/// and fails the request with 500 rather than being papered over.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(principal) => Ok(Self(principal.clone())),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "authenticated route reached without a principal in context"
                );
                Err(missing_context_response())
            }
        }
    }
}

/// The raw bearer credential the verification middleware accepted.
#[derive(Debug, Clone)]
pub struct ForwardedToken(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ForwardedToken {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<BearerToken>() {
            Some(token) => Ok(Self(token.0.clone())),
            None => {
                tracing::error!(
                    path = %parts.uri.path(),
                    "authenticated route reached without a bearer token in context"
                );
                Err(missing_context_response())
            }
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Deadline {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Deadline>()
            .copied()
            .unwrap_or_default())
    }
}

fn missing_context_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(envelope(MSG_INTERNAL_SERVER_ERROR, json!({}))),
    )
        .into_response()
}
