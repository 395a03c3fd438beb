use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use docent_core::{AnswerError, AnswerOptions, ChatMessage, answer_question};

use crate::models::{AskRequest, AskResponse, ConversationResponse, MessageResponse, SummaryResponse};
use crate::state::AppState;

use super::error_response;

/// Ask a question about an uploaded document.
pub async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    tracing::info!(document_id = %req.document_id, "processing question");

    let history: Option<Vec<ChatMessage>> = req.conversation_history.map(|messages| {
        messages
            .into_iter()
            .map(|m| m.into_message())
            .collect()
    });
    let opts = AnswerOptions {
        context_chars: state.config.answer_context_chars,
        history_window: state.config.history_window,
    };

    match answer_question(
        &state.store,
        state.model.as_ref(),
        req.document_id,
        &req.question,
        history.as_deref(),
        opts,
    )
    .await
    {
        Ok(answer) => Json(AskResponse {
            success: true,
            question: req.question,
            answer,
            sources: vec![req.document_id],
            conversation_id: req.document_id,
        })
        .into_response(),
        Err(AnswerError::DocumentNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, "Document not found")
        }
        Err(AnswerError::Model(e)) => {
            tracing::error!(document_id = %req.document_id, error = %e, "answer generation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate answer")
        }
    }
}

/// Conversation history for a document.
pub async fn conversation(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    // The store doesn't distinguish "unknown document" from "no messages";
    // check existence first.
    if state.store.get(id).is_err() {
        return error_response(StatusCode::NOT_FOUND, "Document not found");
    }

    let conversation = state.store.messages(id);
    let message_count = conversation.len();
    Json(ConversationResponse {
        success: true,
        document_id: id,
        conversation,
        message_count,
    })
    .into_response()
}

/// Clear a document's conversation history.
pub async fn clear_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    if state.store.get(id).is_err() {
        return error_response(StatusCode::NOT_FOUND, "Document not found");
    }

    state.store.clear_messages(id);
    Json(MessageResponse {
        success: true,
        message: "Conversation cleared successfully".to_string(),
    })
    .into_response()
}

/// Stored summary for a document.
pub async fn summary(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.store.summary(id) {
        Some(summary) => Json(SummaryResponse {
            success: true,
            document_id: id,
            summary,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Summary not found for this document"),
    }
}
