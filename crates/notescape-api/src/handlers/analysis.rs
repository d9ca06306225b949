use axum::{extract::State, Json};
use serde_json::json;

use crate::services::{AnalysisRun, AnalysisService};
use crate::{ApiError, AppState};

/// Infer relationships across every stored note and persist them.
///
/// POST /api/analyze
pub async fn analyze_notes(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = AnalysisService::new(state.db.clone(), state.extractor.clone());
    let body = match service.run().await? {
        AnalysisRun::NothingToAnalyze => json!({ "status": "nothing_to_analyze" }),
        AnalysisRun::Analyzed(run) => {
            let mut body = serde_json::to_value(&run)
                .map_err(|e| ApiError::Core(notescape_core::Error::from(e)))?;
            if let Some(map) = body.as_object_mut() {
                map.insert("status".to_string(), json!("analyzed"));
            }
            body
        }
    };
    Ok(Json(body))
}
