// ============================================================================
// Response Envelope
// ============================================================================
//
// Every route, success or failure, answers with the same JSON envelope:
//
//   { "message": <string>, "data": <object> }
//
// The message strings form a fixed vocabulary keyed by HTTP status. Raw
// upstream error text never reaches a client through this module.
//
// ============================================================================

use axum::http::StatusCode;
use serde_json::{json, Value};

// Response messages
pub const MSG_OK: &str = "Success";
pub const MSG_BAD_REQUEST: &str = "Bad Request";
pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_FORBIDDEN: &str = "Forbidden";
pub const MSG_NOT_FOUND: &str = "Resource Not Found";
pub const MSG_CONFLICT: &str = "Conflict";
pub const MSG_INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
pub const MSG_SERVICE_UNAVAILABLE: &str = "Service Unavailable";

// gRPC metadata keys for forwarded identity
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_ID: &str = "x-user-id";

/// Builds the standard response envelope.
pub fn envelope(message: &str, data: Value) -> Value {
    json!({
        "message": message,
        "data": data,
    })
}

/// Fixed status→message table. Unlisted statuses fall back to the internal
/// error message rather than echoing anything upstream-supplied.
pub fn status_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::OK => MSG_OK,
        StatusCode::BAD_REQUEST => MSG_BAD_REQUEST,
        StatusCode::UNAUTHORIZED => MSG_UNAUTHORIZED,
        StatusCode::FORBIDDEN => MSG_FORBIDDEN,
        StatusCode::NOT_FOUND => MSG_NOT_FOUND,
        StatusCode::CONFLICT => MSG_CONFLICT,
        StatusCode::INTERNAL_SERVER_ERROR => MSG_INTERNAL_SERVER_ERROR,
        StatusCode::SERVICE_UNAVAILABLE => MSG_SERVICE_UNAVAILABLE,
        _ => MSG_INTERNAL_SERVER_ERROR,
    }
}
