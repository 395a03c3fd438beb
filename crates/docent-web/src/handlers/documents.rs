use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::models::{DocumentResponse, DocumentsResponse, MessageResponse};
use crate::state::AppState;

use super::error_response;

/// List metadata for every stored document.
pub async fn list(State(state): State<Arc<AppState>>) -> Response {
    let documents = state.store.list();
    let count = documents.len();
    Json(DocumentsResponse {
        success: true,
        documents,
        count,
    })
    .into_response()
}

/// Fetch one document's composite view.
pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.store.get(id) {
        Ok(document) => Json(DocumentResponse {
            success: true,
            document,
        })
        .into_response(),
        Err(_) => error_response(StatusCode::NOT_FOUND, "Document not found"),
    }
}

/// Delete a document and everything derived from it.
pub async fn delete(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    if state.store.remove(id) {
        Json(MessageResponse {
            success: true,
            message: "Document deleted successfully".to_string(),
        })
        .into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "Document not found")
    }
}
