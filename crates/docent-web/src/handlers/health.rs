use axum::Json;
use axum::response::IntoResponse;

/// Root banner.
pub async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "online",
        "message": "docent API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "docent",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
