//! Google Gemini backend implementing the core model contract.
//!
//! Talks to the `generateContent` REST endpoint with a plain JSON body and
//! no SDK. Summarization asks for a fixed-shape JSON object and normalizes
//! whatever comes back — list-valued fields are flattened to comma-joined
//! strings, non-strings stringified — and falls back to
//! [`PaperSummary::fallback`] on any transport, API, or parse failure, so
//! the summarize path never fails. Answering surfaces typed errors and lets
//! the orchestrator decide ledger behavior.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use docent_core::{BoxFuture, Config, ModelBackend, ModelError, PaperSummary};

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    summary_input_chars: usize,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            summary_input_chars: config.summary_input_chars,
        })
    }

    /// Point the client at a different base URL (test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// One prompt in, first candidate's text out.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self.client.post(self.endpoint()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|text| !text.is_empty())
            .ok_or(ModelError::Empty)
    }
}

fn summary_prompt(excerpt: &str) -> String {
    format!(
        "Analyze the following research paper text and generate a structured summary \
         with these exact sections:\n\nTEXT:\n{excerpt}\n\n\
         Please provide the summary in JSON format with these fields:\n\
         - title: The title of the paper (string)\n\
         - authors: The authors of the paper as a SINGLE STRING with comma-separated names, \
         e.g., \"John Doe, Jane Smith\" (NOT a list)\n\
         - abstract: A brief abstract (2-3 sentences, string)\n\
         - problem_statement: The main problem being addressed (2-3 sentences, string)\n\
         - methodology: The research methodology (3-4 sentences, string)\n\
         - key_results: The key findings/results (3-4 sentences, string)\n\
         - conclusion: The conclusion and implications (2-3 sentences, string)\n\n\
         IMPORTANT:\n\
         - authors MUST be a single STRING with comma-separated values, NOT a JSON array\n\
         - All values must be strings\n\
         - Return ONLY valid JSON without any markdown formatting or extra text."
    )
}

fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        "You are an expert research assistant. Based on the provided document and \
         conversation history, answer the following question accurately and concisely.\n\n\
         {context}\n\
         Question: {question}\n\n\
         Provide a clear, accurate answer based on the document content. If the answer \
         is not in the document, say \"This information is not available in the provided \
         document.\""
    )
}

/// Strip a leading markdown code fence (``` or ```json) if present.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Flatten any JSON value into the plain string the summary shape demands.
///
/// Strings pass through, lists join with `", "`, null becomes empty, and
/// everything else is stringified.
fn field_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse the model's summary response into a [`PaperSummary`].
///
/// Missing `title`/`authors` get placeholder values; other missing fields
/// become empty strings.
fn parse_summary(response: &str) -> Result<PaperSummary, ModelError> {
    let cleaned = strip_code_fence(response);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ModelError::Parse(format!("summary is not valid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| ModelError::Parse("summary is not a JSON object".to_string()))?;

    let field = |name: &str, missing: &str| {
        object
            .get(name)
            .filter(|v| !v.is_null())
            .map(field_string)
            .unwrap_or_else(|| missing.to_string())
    };

    Ok(PaperSummary {
        title: field("title", "Unknown Title"),
        authors: field("authors", "Unknown Authors"),
        abstract_text: field("abstract", ""),
        problem_statement: field("problem_statement", ""),
        methodology: field("methodology", ""),
        key_results: field("key_results", ""),
        conclusion: field("conclusion", ""),
    })
}

impl ModelBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn summarize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, PaperSummary> {
        Box::pin(async move {
            let excerpt = docent_core::truncate_chars(text, self.summary_input_chars);
            let prompt = summary_prompt(excerpt);

            match self.generate(&prompt).await {
                Ok(response) => match parse_summary(&response) {
                    Ok(summary) => {
                        tracing::info!("summary generated");
                        summary
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "summary response unusable, using fallback");
                        PaperSummary::fallback(text)
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "summary generation failed, using fallback");
                    PaperSummary::fallback(text)
                }
            }
        })
    }

    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> BoxFuture<'a, Result<String, ModelError>> {
        Box::pin(async move {
            let prompt = answer_prompt(question, context);
            let answer = self.generate(&prompt).await?;
            tracing::info!("question answered");
            Ok(answer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_parses() {
        let summary = parse_summary(
            r#"{"title": "T", "authors": "A, B", "abstract": "abs",
                "problem_statement": "p", "methodology": "m",
                "key_results": "k", "conclusion": "c"}"#,
        )
        .unwrap();
        assert_eq!(summary.title, "T");
        assert_eq!(summary.authors, "A, B");
        assert_eq!(summary.abstract_text, "abs");
        assert_eq!(summary.conclusion, "c");
    }

    #[test]
    fn code_fence_is_stripped() {
        let fenced = "```json\n{\"title\": \"Fenced\"}\n```";
        assert_eq!(parse_summary(fenced).unwrap().title, "Fenced");

        let bare_fence = "```\n{\"title\": \"Bare\"}\n```";
        assert_eq!(parse_summary(bare_fence).unwrap().title, "Bare");
    }

    #[test]
    fn authors_list_is_joined_to_a_string() {
        let summary = parse_summary(r#"{"title": "T", "authors": ["A", "B"]}"#).unwrap();
        assert_eq!(summary.authors, "A, B");
    }

    #[test]
    fn non_string_fields_are_stringified() {
        let summary = parse_summary(
            r#"{"title": 42, "authors": "A", "abstract": null, "key_results": true}"#,
        )
        .unwrap();
        assert_eq!(summary.title, "42");
        assert_eq!(summary.abstract_text, "");
        assert_eq!(summary.key_results, "true");
    }

    #[test]
    fn missing_fields_get_placeholders_or_empty() {
        let summary = parse_summary("{}").unwrap();
        assert_eq!(summary.title, "Unknown Title");
        assert_eq!(summary.authors, "Unknown Authors");
        assert_eq!(summary.abstract_text, "");
        assert_eq!(summary.methodology, "");
    }

    #[test]
    fn non_json_response_is_a_parse_error() {
        assert!(matches!(
            parse_summary("Here is your summary: ..."),
            Err(ModelError::Parse(_))
        ));
    }

    #[test]
    fn non_object_json_is_a_parse_error() {
        assert!(matches!(
            parse_summary(r#"["not", "an", "object"]"#),
            Err(ModelError::Parse(_))
        ));
    }

    #[test]
    fn endpoint_includes_model_and_key() {
        let config = Config {
            gemini_api_key: "k123".to_string(),
            ..Config::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent?key=k123"
        );
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let client = GeminiClient::new(&Config::default())
            .unwrap()
            .with_base_url("http://localhost:9090/");
        assert!(client.endpoint().starts_with("http://localhost:9090/v1beta/"));
    }

    #[test]
    fn answer_prompt_embeds_context_and_question() {
        let prompt = answer_prompt("What is X?", "Document Content:\nbody\n\n");
        assert!(prompt.contains("Document Content:\nbody"));
        assert!(prompt.contains("Question: What is X?"));
        assert!(prompt.contains("not available in the provided document"));
    }

    #[test]
    fn summary_prompt_pins_authors_to_a_string() {
        let prompt = summary_prompt("excerpt");
        assert!(prompt.contains("TEXT:\nexcerpt"));
        assert!(prompt.contains("NOT a JSON array"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }
}
