//! Integration tests for the upload→ask→ledger flow.
//!
//! These tests drive the [`DocumentStore`] and the answering orchestrator
//! against a [`MockModel`], so no HTTP requests are made.

use docent_core::{
    AnswerError, AnswerOptions, ChatRole, DocumentStore, MockModel, ModelBackend, PaperSummary,
    answer_question,
};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Insert a document the way the upload flow does: extracted text, a
/// model-produced summary, and extractor metadata.
async fn upload(store: &DocumentStore, model: &MockModel, text: &str, filename: &str) -> Uuid {
    let summary = model.summarize(text).await;
    let mut metadata = Map::new();
    metadata.insert("filename".into(), Value::String(filename.into()));
    metadata.insert("size".into(), Value::from(text.len()));
    metadata.insert("pages".into(), Value::from(1));

    let id = Uuid::new_v4();
    store.insert(id, text.to_string(), summary, metadata);
    id
}

#[tokio::test]
async fn ask_appends_question_then_answer() {
    let store = DocumentStore::new();
    let model = MockModel::answering("The paper studies transformers.");
    let id = upload(&store, &model, "Attention Is All You Need\nbody", "att.pdf").await;

    let answer = answer_question(
        &store,
        &model,
        id,
        "What does the paper study?",
        None,
        AnswerOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(answer, "The paper studies transformers.");
    let messages = store.messages(id);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[0].content, "What does the paper study?");
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].content, "The paper studies transformers.");
    assert!(messages[1].timestamp >= messages[0].timestamp);
}

#[tokio::test]
async fn repeated_questions_grow_the_ledger_in_order() {
    let store = DocumentStore::new();
    let model = MockModel::answering("yes");
    let id = upload(&store, &model, "some text", "doc.pdf").await;

    for question in ["Q1", "Q2", "Q3"] {
        answer_question(&store, &model, id, question, None, AnswerOptions::default())
            .await
            .unwrap();
    }

    let messages = store.messages(id);
    assert_eq!(messages.len(), 6);
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["Q1", "yes", "Q2", "yes", "Q3", "yes"]);
    assert!(messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn stored_history_feeds_the_next_context_window() {
    let store = DocumentStore::new();
    let model = MockModel::answering("follow-up answer");
    let id = upload(&store, &model, "document body", "doc.pdf").await;

    answer_question(&store, &model, id, "first question", None, AnswerOptions::default())
        .await
        .unwrap();
    answer_question(&store, &model, id, "second question", None, AnswerOptions::default())
        .await
        .unwrap();

    let context = model.last_context().unwrap();
    assert!(context.contains("Document Content:\ndocument body"));
    assert!(context.contains("user: first question"));
    assert!(context.contains("assistant: follow-up answer"));
    // The second question itself is not part of the prior history.
    assert!(!context.contains("user: second question"));
}

#[tokio::test]
async fn history_override_replaces_the_stored_ledger_as_context() {
    let store = DocumentStore::new();
    let model = MockModel::answering("ok");
    let id = upload(&store, &model, "document body", "doc.pdf").await;

    store
        .append_message(id, ChatRole::User, "stored question")
        .unwrap();

    let override_history = vec![docent_core::ChatMessage {
        role: ChatRole::Assistant,
        content: "client-side note".to_string(),
        timestamp: chrono::Utc::now(),
    }];
    answer_question(
        &store,
        &model,
        id,
        "q",
        Some(&override_history),
        AnswerOptions::default(),
    )
    .await
    .unwrap();

    let context = model.last_context().unwrap();
    assert!(context.contains("assistant: client-side note"));
    assert!(!context.contains("stored question"));
}

#[tokio::test]
async fn unknown_document_is_not_found_and_calls_no_model() {
    let store = DocumentStore::new();
    let model = MockModel::answering("never");
    let id = Uuid::new_v4();

    let err = answer_question(&store, &model, id, "q", None, AnswerOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnswerError::DocumentNotFound(found) if found == id));
    assert_eq!(model.answer_calls(), 0);
}

#[tokio::test]
async fn model_failure_leaves_the_ledger_untouched() {
    let store = DocumentStore::new();
    let model = MockModel::failing("quota exceeded");
    let id = upload(&store, &model, "document body", "doc.pdf").await;

    let err = answer_question(&store, &model, id, "q", None, AnswerOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AnswerError::Model(_)));
    // No partial append of the question alone.
    assert!(store.messages(id).is_empty());
}

#[tokio::test]
async fn uploaded_summary_uses_fallback_shape() {
    let store = DocumentStore::new();
    let model = MockModel::answering("a");
    let id = upload(&store, &model, "My Paper Title\nrest", "p.pdf").await;

    let summary = store.summary(id).unwrap();
    assert_eq!(summary.title, "My Paper Title");
    assert_eq!(summary.authors, "Authors not extracted");
}

#[tokio::test]
async fn canned_summary_is_stored_verbatim() {
    let store = DocumentStore::new();
    let model = MockModel::answering("a").with_summary(PaperSummary {
        title: "Canned".to_string(),
        authors: "A, B".to_string(),
        abstract_text: "abs".to_string(),
        problem_statement: String::new(),
        methodology: String::new(),
        key_results: String::new(),
        conclusion: String::new(),
    });
    let id = upload(&store, &model, "text", "p.pdf").await;

    let summary = store.summary(id).unwrap();
    assert_eq!(summary.title, "Canned");
    assert_eq!(summary.authors, "A, B");
}
