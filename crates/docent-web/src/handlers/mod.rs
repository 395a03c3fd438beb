pub mod chat;
pub mod documents;
pub mod health;
pub mod search;
pub mod upload;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Uniform JSON error body with the matching status code.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
