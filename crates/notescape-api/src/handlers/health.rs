use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the NoteScape API" }))
}

/// Liveness plus the provider decision made at startup.
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "strategy": state.extractor.strategy().to_string(),
        "embedding": state.selection,
    }))
}
