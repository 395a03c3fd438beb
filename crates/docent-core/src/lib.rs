use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod model;
pub mod orchestrator;
pub mod search;
pub mod store;
pub mod text;

// Re-export for convenience
pub use config::Config;
pub use model::{BoxFuture, MockModel, ModelBackend, ModelError};
pub use orchestrator::{AnswerError, AnswerOptions, answer_question, build_context};
pub use search::SearchHit;
pub use store::{DocumentStore, DocumentView, StoreError};
pub use text::truncate_chars;

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        })
    }
}

/// A single role-tagged message in a document's conversation ledger.
///
/// The timestamp is assigned by the store at append time, never by the
/// caller, so timestamps within one ledger are non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Structured summary of a stored document.
///
/// Every field is always a plain string: empty when a section could not be
/// extracted, never absent, never a nested value. `authors` in particular is
/// a single comma-joined string even when the upstream model emits a list —
/// response parsing flattens it before this type is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperSummary {
    pub title: String,
    pub authors: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub problem_statement: String,
    pub methodology: String,
    pub key_results: String,
    pub conclusion: String,
}

impl PaperSummary {
    /// Degraded summary used when generation or response parsing fails.
    ///
    /// The first non-empty line of the document stands in for the title and
    /// every section carries a review-the-document notice, so callers always
    /// get a well-formed summary.
    pub fn fallback(text: &str) -> Self {
        let title = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("Research Paper");

        Self {
            title: title.to_string(),
            authors: "Authors not extracted".to_string(),
            abstract_text: "Unable to generate abstract automatically. Please review the document."
                .to_string(),
            problem_statement: "Unable to extract problem statement. Please review the document."
                .to_string(),
            methodology: "Unable to extract methodology. Please review the document.".to_string(),
            key_results: "Unable to extract key results. Please review the document.".to_string(),
            conclusion: "Unable to extract conclusion. Please review the document.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&ChatRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn chat_role_displays_lowercase() {
        assert_eq!(ChatRole::User.to_string(), "user");
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn summary_serializes_abstract_under_its_json_name() {
        let summary = PaperSummary {
            title: "T".into(),
            authors: "A".into(),
            abstract_text: "abs".into(),
            problem_statement: String::new(),
            methodology: String::new(),
            key_results: String::new(),
            conclusion: String::new(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["abstract"], "abs");
        assert!(json.get("abstract_text").is_none());
    }

    #[test]
    fn fallback_title_is_first_non_empty_line() {
        let summary = PaperSummary::fallback("\n\n  Attention Is All You Need\nVaswani et al.");
        assert_eq!(summary.title, "Attention Is All You Need");
        assert_eq!(summary.authors, "Authors not extracted");
    }

    #[test]
    fn fallback_on_empty_text_uses_placeholder_title() {
        let summary = PaperSummary::fallback("");
        assert_eq!(summary.title, "Research Paper");
    }

    #[test]
    fn fallback_sections_are_never_empty() {
        let summary = PaperSummary::fallback("Some Paper");
        for field in [
            &summary.abstract_text,
            &summary.problem_statement,
            &summary.methodology,
            &summary.key_results,
            &summary.conclusion,
        ] {
            assert!(field.contains("Please review the document"));
        }
    }
}
