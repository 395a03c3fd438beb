use std::sync::Arc;

use docent_core::{Config, DocumentStore, ModelBackend};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub store: DocumentStore,
    pub model: Arc<dyn ModelBackend>,
    pub config: Config,
}
