use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

mod handlers;
mod models;
mod state;

use docent_core::{Config, DocumentStore, ModelBackend};
use docent_gemini::GeminiClient;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    tracing::info!(?config, "configuration loaded");
    if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; summarization and answering will fail");
    }

    let model: Arc<dyn ModelBackend> =
        Arc::new(GeminiClient::new(&config).context("failed to build Gemini client")?);
    let state = Arc::new(AppState {
        store: DocumentStore::new(),
        model,
        config: config.clone(),
    });

    // Upload cap plus headroom for multipart framing.
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes + 1024 * 1024);

    let app = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health))
        .route("/api/upload/", post(handlers::upload::upload))
        .route("/api/upload/documents", get(handlers::documents::list))
        .route(
            "/api/upload/document/{id}",
            get(handlers::documents::get).delete(handlers::documents::delete),
        )
        .route("/api/search", get(handlers::search::search))
        .route("/api/chat/ask", post(handlers::chat::ask))
        .route(
            "/api/chat/conversation/{id}",
            get(handlers::chat::conversation).delete(handlers::chat::clear_conversation),
        )
        .route("/api/chat/summary/{id}", get(handlers::chat::summary))
        .layer(CorsLayer::permissive())
        .layer(body_limit)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
