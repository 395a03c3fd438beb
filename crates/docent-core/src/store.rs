//! In-memory document store.
//!
//! Single source of truth for every uploaded document: full text, structured
//! summary, metadata, and the per-document conversation ledger live together
//! in one record, so create and delete are atomic across all of them by
//! construction. Backed by a [`DashMap`] — shard locks serialize mutation of
//! any one record (ledger appends included) while reads of other documents
//! proceed concurrently. No guard is ever held across an await point; the
//! store is fully synchronous.
//!
//! Lifetime is the process: nothing is persisted, nothing expires.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::search::{self, SearchHit};
use crate::{ChatMessage, ChatRole, PaperSummary};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(Uuid),
}

/// Composite read view of one stored document (conversation excluded —
/// fetched separately via [`DocumentStore::messages`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    pub document_id: Uuid,
    pub text: String,
    pub summary: PaperSummary,
    pub metadata: Map<String, Value>,
}

/// Everything the store holds for one document.
struct DocumentRecord {
    text: String,
    summary: PaperSummary,
    metadata: Map<String, Value>,
    conversation: Vec<ChatMessage>,
    /// Insertion sequence, used to keep `list` and search tie-breaks in
    /// insertion order (DashMap iteration order is arbitrary).
    seq: u64,
}

/// Process-wide document store, constructed once at startup and handed to
/// the API layer explicitly (no global).
pub struct DocumentStore {
    docs: DashMap<Uuid, DocumentRecord>,
    next_seq: AtomicU64,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Insert a document record.
    ///
    /// Stamps `metadata.stored_at` (RFC 3339, store clock) and
    /// `metadata.document_id`, and starts an empty conversation ledger.
    /// Inserting an id that already exists silently overwrites the whole
    /// record, conversation included — documented behavior of the original
    /// service, preserved rather than fixed.
    pub fn insert(
        &self,
        id: Uuid,
        text: String,
        summary: PaperSummary,
        mut metadata: Map<String, Value>,
    ) {
        metadata.insert("stored_at".into(), Value::String(Utc::now().to_rfc3339()));
        metadata.insert("document_id".into(), Value::String(id.to_string()));

        let record = DocumentRecord {
            text,
            summary,
            metadata,
            conversation: Vec::new(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };

        if self.docs.insert(id, record).is_some() {
            tracing::info!(%id, "document overwritten");
        } else {
            tracing::info!(%id, "document stored");
        }
    }

    /// Composite view of one document, or [`StoreError::NotFound`].
    pub fn get(&self, id: Uuid) -> Result<DocumentView, StoreError> {
        let record = self.docs.get(&id).ok_or_else(|| {
            tracing::warn!(%id, "document not found");
            StoreError::NotFound(id)
        })?;
        Ok(DocumentView {
            document_id: id,
            text: record.text.clone(),
            summary: record.summary.clone(),
            metadata: record.metadata.clone(),
        })
    }

    /// Raw extracted text only.
    pub fn text(&self, id: Uuid) -> Option<String> {
        self.docs.get(&id).map(|r| r.text.clone())
    }

    /// Stored summary only.
    pub fn summary(&self, id: Uuid) -> Option<PaperSummary> {
        self.docs.get(&id).map(|r| r.summary.clone())
    }

    /// One metadata map per stored document, in insertion order.
    pub fn list(&self) -> Vec<Map<String, Value>> {
        let mut entries: Vec<(u64, Map<String, Value>)> = self
            .docs
            .iter()
            .map(|r| (r.seq, r.metadata.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, m)| m).collect()
    }

    /// Remove a document and everything derived from it.
    ///
    /// Returns whether a record was actually removed; `false` for an
    /// unknown id.
    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.docs.remove(&id).is_some();
        if removed {
            tracing::info!(%id, "document deleted");
        } else {
            tracing::warn!(%id, "delete of unknown document");
        }
        removed
    }

    /// Rank stored documents against a free-text query.
    ///
    /// Naive keyword-frequency scoring (see [`crate::search`]); zero-score
    /// documents are dropped, ties resolve to insertion order, and at most
    /// `top_k` hits are returned. Empty query or `top_k == 0` yields no hits.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let terms = search::query_terms(query);
        if terms.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(u64, SearchHit)> = self
            .docs
            .iter()
            .filter_map(|entry| {
                let score = search::score_text(&entry.text.to_lowercase(), &terms);
                (score > 0).then(|| {
                    (
                        entry.seq,
                        SearchHit {
                            document_id: *entry.key(),
                            score,
                            snippet: search::snippet(&entry.text),
                        },
                    )
                })
            })
            .collect();

        // Insertion order first, then a stable sort by score, so equal
        // scores keep insertion order.
        scored.sort_by_key(|(seq, _)| *seq);
        scored.sort_by(|(_, a), (_, b)| b.score.cmp(&a.score));
        scored.truncate(top_k);

        tracing::info!(query, hits = scored.len(), "search completed");
        scored.into_iter().map(|(_, hit)| hit).collect()
    }

    /// Append a message to a document's conversation ledger.
    ///
    /// The timestamp is assigned here, at the moment of append, and returned
    /// to the caller. Appends to the same document serialize on the record's
    /// shard lock, so timestamps within one ledger are non-decreasing.
    pub fn append_message(
        &self,
        id: Uuid,
        role: ChatRole,
        content: impl Into<String>,
    ) -> Result<DateTime<Utc>, StoreError> {
        let mut record = self.docs.get_mut(&id).ok_or_else(|| {
            tracing::warn!(%id, "append to unknown document");
            StoreError::NotFound(id)
        })?;
        let timestamp = Utc::now();
        record.conversation.push(ChatMessage {
            role,
            content: content.into(),
            timestamp,
        });
        tracing::info!(%id, %role, "message appended");
        Ok(timestamp)
    }

    /// Snapshot of a document's conversation, in append order.
    ///
    /// Empty for an unknown document as well as for an empty ledger — the
    /// two are indistinguishable here; callers that care check existence
    /// via [`get`](Self::get) first.
    pub fn messages(&self, id: Uuid) -> Vec<ChatMessage> {
        self.docs
            .get(&id)
            .map(|r| r.conversation.clone())
            .unwrap_or_default()
    }

    /// Truncate a document's conversation ledger. Irreversible.
    ///
    /// Silent no-op for an unknown id; callers confirm existence first.
    pub fn clear_messages(&self, id: Uuid) {
        if let Some(mut record) = self.docs.get_mut(&id) {
            record.conversation.clear();
            tracing::info!(%id, "conversation cleared");
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
