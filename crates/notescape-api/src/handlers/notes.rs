//! Note CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use notescape_core::{NewNote, Note, Relationship};

use crate::{ApiError, AppState};

/// Create a note.
///
/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    Json(req): Json<NewNote>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    if req.title.trim().is_empty() && req.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "note needs a title or content".to_string(),
        ));
    }

    let id = state.db.notes.create(req).await?;
    let note = state
        .db
        .notes
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Note not found: {}", id)))?;
    info!(note_id = %id, "Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// List every note.
///
/// GET /api/notes
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.db.notes.list_all().await?))
}

/// GET /api/notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    state
        .db
        .notes
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Note not found: {}", id)))
}

/// Delete a note with its relationships and indexed vector.
///
/// DELETE /api/notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.db.delete_note(&id).await? {
        info!(note_id = %id, "Note deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Note not found: {}", id)))
    }
}

/// GET /api/notes/:id/relationships
pub async fn note_relationships(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Relationship>>, ApiError> {
    if state.db.notes.get(&id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Note not found: {}", id)));
    }
    Ok(Json(state.db.notes.relationships_for(&id).await?))
}
