use axum::{extract::State, Json};

use notescape_core::GraphData;

use crate::{ApiError, AppState};

/// Graph payload for visualization front-ends.
///
/// GET /api/graph
pub async fn get_graph(State(state): State<AppState>) -> Result<Json<GraphData>, ApiError> {
    Ok(Json(state.db.graph_data().await?))
}
