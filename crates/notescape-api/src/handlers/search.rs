use axum::{extract::State, Json};
use serde::Deserialize;

use notescape_core::defaults;

use crate::services::{SearchResults, SearchService};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    defaults::SEARCH_LIMIT
}

/// Semantic search, falling back to text search without an embedding provider.
///
/// POST /api/search
pub async fn search_notes(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResults>, ApiError> {
    let limit = req.limit.clamp(1, defaults::SEARCH_LIMIT_MAX);
    let service = SearchService::new(state.db.clone(), state.embedder.clone());
    Ok(Json(service.search(&req.query, limit).await?))
}
