use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use crate::models::{SearchParams, SearchResponse};
use crate::state::AppState;

/// Rank stored documents against a free-text query.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let top_k = params.top_k.unwrap_or(state.config.search_top_k);
    let results = state.store.search(&params.q, top_k);
    let count = results.len();
    Json(SearchResponse {
        success: true,
        results,
        count,
    })
    .into_response()
}
