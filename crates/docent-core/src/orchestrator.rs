//! Question-answering pipeline.
//!
//! Fetches the document's text from the store, builds a bounded context
//! window (character-budgeted document excerpt plus the last few prior
//! messages), delegates to the model backend, and on success appends the
//! question and the answer to the document's conversation ledger. A backend
//! failure leaves the ledger untouched — the question is never appended
//! alone. No store guard is held while the model call is in flight.

use thiserror::Error;
use uuid::Uuid;

use crate::model::{ModelBackend, ModelError};
use crate::store::{DocumentStore, StoreError};
use crate::text::truncate_chars;
use crate::{ChatMessage, ChatRole};

#[derive(Error, Debug)]
pub enum AnswerError {
    #[error("document not found: {0}")]
    DocumentNotFound(Uuid),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl From<StoreError> for AnswerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AnswerError::DocumentNotFound(id),
        }
    }
}

/// Bounds on the context window handed to the model.
#[derive(Debug, Clone, Copy)]
pub struct AnswerOptions {
    /// Character budget for the document excerpt.
    pub context_chars: usize,
    /// How many trailing prior messages to include.
    pub history_window: usize,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            context_chars: 3000,
            history_window: 3,
        }
    }
}

/// Build the bounded context window for one question.
///
/// The document text is cut to `context_chars` characters; at most the last
/// `history_window` messages follow as `role: content` lines under a
/// "Previous conversation:" header (omitted when there is no history).
pub fn build_context(text: &str, history: &[ChatMessage], opts: AnswerOptions) -> String {
    let mut context = format!(
        "Document Content:\n{}\n\n",
        truncate_chars(text, opts.context_chars)
    );

    let start = history.len().saturating_sub(opts.history_window);
    let recent = &history[start..];
    if !recent.is_empty() {
        context.push_str("Previous conversation:\n");
        for message in recent {
            context.push_str(&format!("{}: {}\n", message.role, message.content));
        }
    }

    context
}

/// Answer a question about a stored document.
///
/// `history_override` replaces the stored ledger as prompt context when
/// provided (the ledger is still where the new question/answer pair lands).
pub async fn answer_question(
    store: &DocumentStore,
    model: &dyn ModelBackend,
    document_id: Uuid,
    question: &str,
    history_override: Option<&[ChatMessage]>,
    opts: AnswerOptions,
) -> Result<String, AnswerError> {
    let text = store
        .text(document_id)
        .ok_or(AnswerError::DocumentNotFound(document_id))?;

    let history = match history_override {
        Some(history) => history.to_vec(),
        None => store.messages(document_id),
    };
    let context = build_context(&text, &history, opts);

    tracing::info!(%document_id, backend = model.name(), "answering question");
    let answer = model.answer(question, &context).await?;

    // Question first, then answer: two separate timestamped appends.
    store.append_message(document_id, ChatRole::User, question)?;
    store.append_message(document_id, ChatRole::Assistant, answer.clone())?;

    tracing::info!(%document_id, "question answered");
    Ok(answer)
}
