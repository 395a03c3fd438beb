//! Model backend contract: the summarizer/answerer boundary.
//!
//! The core never talks to an LLM API directly; it goes through
//! [`ModelBackend`]. Summarization is infallible by contract — a backend
//! converts generation or parse failures into [`PaperSummary::fallback`]
//! itself — while answering surfaces a typed [`ModelError`] so the
//! orchestrator can decide what to do with the ledger.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::PaperSummary;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("failed to parse model response: {0}")]
    Parse(String),
    #[error("model returned no candidates")]
    Empty,
}

/// A backend that can summarize document text and answer questions about it.
pub trait ModelBackend: Send + Sync {
    /// The canonical name of this backend (e.g., "gemini").
    fn name(&self) -> &str;

    /// Produce a structured summary of `text`.
    ///
    /// Never fails: implementations fall back to
    /// [`PaperSummary::fallback`] when generation or parsing goes wrong.
    fn summarize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, PaperSummary>;

    /// Answer `question` from the orchestrator-built `context` window.
    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> BoxFuture<'a, Result<String, ModelError>>;
}

/// Canned [`ModelBackend`] for tests.
///
/// Returns a fixed answer (or a forced failure), counts calls, and records
/// the last context it was handed so tests can assert on the prompt window.
pub struct MockModel {
    summary: Option<PaperSummary>,
    answer: Result<String, String>,
    summarize_calls: AtomicUsize,
    answer_calls: AtomicUsize,
    last_context: Mutex<Option<String>>,
}

impl MockModel {
    /// Mock that answers every question with `answer` and summarizes with
    /// the fallback summary.
    pub fn answering(answer: &str) -> Self {
        Self {
            summary: None,
            answer: Ok(answer.to_string()),
            summarize_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    /// Mock whose `answer` calls always fail with an API error.
    pub fn failing(message: &str) -> Self {
        Self {
            summary: None,
            answer: Err(message.to_string()),
            summarize_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    /// Replace the fallback summary with a canned one.
    pub fn with_summary(mut self, summary: PaperSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// How many times `summarize()` has been called.
    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }

    /// How many times `answer()` has been called.
    pub fn answer_calls(&self) -> usize {
        self.answer_calls.load(Ordering::SeqCst)
    }

    /// The context window passed to the most recent `answer()` call.
    pub fn last_context(&self) -> Option<String> {
        self.last_context.lock().ok().and_then(|c| c.clone())
    }
}

impl ModelBackend for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    fn summarize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, PaperSummary> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        let summary = self
            .summary
            .clone()
            .unwrap_or_else(|| PaperSummary::fallback(text));
        Box::pin(async move { summary })
    }

    fn answer<'a>(
        &'a self,
        _question: &'a str,
        context: &'a str,
    ) -> BoxFuture<'a, Result<String, ModelError>> {
        self.answer_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_context.lock() {
            *last = Some(context.to_string());
        }
        let response = self.answer.clone();
        Box::pin(async move {
            response.map_err(|message| ModelError::Api {
                status: 500,
                message,
            })
        })
    }
}
