use docent_core::{ChatMessage, ChatRole, DocumentView, PaperSummary, SearchHit};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// ── Chat ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub document_id: Uuid,
    pub question: String,
    /// Optional client-side history used only as prompt context; the stored
    /// ledger is the fallback when absent.
    pub conversation_history: Option<Vec<HistoryMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub role: ChatRole,
    pub content: String,
}

impl HistoryMessage {
    pub fn into_message(self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content,
            timestamp: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub success: bool,
    pub question: String,
    pub answer: String,
    pub sources: Vec<Uuid>,
    pub conversation_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub success: bool,
    pub document_id: Uuid,
    pub conversation: Vec<ChatMessage>,
    pub message_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub document_id: Uuid,
    pub summary: PaperSummary,
}

// ── Upload / documents ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub document_id: Uuid,
    pub filename: String,
    pub summary: PaperSummary,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub success: bool,
    pub documents: Vec<Map<String, Value>>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    pub document: DocumentView,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ── Search ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchHit>,
    pub count: usize,
}
