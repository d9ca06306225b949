//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Error returned by every handler, rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    Core(notescape_core::Error),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unavailable(String),
    Upstream(String),
}

impl From<notescape_core::Error> for ApiError {
    fn from(err: notescape_core::Error) -> Self {
        use notescape_core::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(id) => ApiError::NotFound(format!("Note not found: {}", id)),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            err @ Error::EmptyBatch => ApiError::BadRequest(err.to_string()),
            Error::ProviderUnavailable(msg) => ApiError::Unavailable(msg),
            err @ Error::Provider { .. } => ApiError::Upstream(err.to_string()),
            other => ApiError::Core(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Core(err) => {
                error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notescape_core::{Error, Stage};

    fn status_of(err: Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(Error::NoteNotFound("n1".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::InvalidInput("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(Error::Conflict("note already exists: n1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(Error::ProviderUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(Error::provider(Stage::Embedding, "500")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(Error::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
