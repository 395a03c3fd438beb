use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::models::UploadResponse;
use crate::state::AppState;

use super::error_response;

/// Accept a PDF upload: validate, extract text, summarize, store.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut filename: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("Failed to read form field: {e}"),
                );
            }
        };

        if field.name() == Some("file") {
            filename = Some(field.file_name().unwrap_or("upload.pdf").to_string());
            match field.bytes().await {
                Ok(bytes) => data = Some(bytes.to_vec()),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        &format!("Failed to read file data: {e}"),
                    );
                }
            }
        } else {
            // Ignore unknown fields
            let _ = field.bytes().await;
        }
    }

    let (Some(filename), Some(data)) = (filename, data) else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    if let Err(e) = docent_extract::validate(&data, &filename, state.config.max_upload_bytes) {
        tracing::error!(%filename, error = %e, "PDF validation failed");
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid PDF file or file size exceeds limit",
        );
    }

    // Extraction is CPU-bound; keep it off the async workers.
    let size = data.len();
    let extraction = match tokio::task::spawn_blocking(move || docent_extract::extract(&data)).await
    {
        Ok(Ok(extraction)) => extraction,
        Ok(Err(e)) => {
            tracing::error!(%filename, error = %e, "text extraction failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to extract text from PDF",
            );
        }
        Err(e) => {
            tracing::error!(%filename, error = %e, "extraction task panicked");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to extract text from PDF",
            );
        }
    };

    // Infallible by contract: falls back to a degraded summary internally.
    let summary = state.model.summarize(&extraction.text).await;

    let metadata = docent_extract::metadata(&filename, size, extraction.pages);
    let document_id = Uuid::new_v4();
    state
        .store
        .insert(document_id, extraction.text, summary.clone(), metadata);

    let view = match state.store.get(document_id) {
        Ok(view) => view,
        Err(e) => {
            tracing::error!(%document_id, error = %e, "stored document unreadable");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store document");
        }
    };

    tracing::info!(%document_id, %filename, pages = extraction.pages, "document uploaded");
    Json(UploadResponse {
        success: true,
        document_id,
        filename,
        summary,
        metadata: view.metadata,
    })
    .into_response()
}
