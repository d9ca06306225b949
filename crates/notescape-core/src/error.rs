//! Error types for notescape.

use std::fmt;

use thiserror::Error;

/// Result type alias using notescape's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage a provider failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Turning note content into vectors.
    Embedding,
    /// Named entity recognition over a note.
    EntityExtraction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding => write!(f, "embedding"),
            Self::EntityExtraction => write!(f, "entity_extraction"),
        }
    }
}

/// Core error type for notescape operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No embedding/entity backend is reachable. Needs operator action.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A backend call failed transiently; the whole batch can be retried.
    #[error("Provider error during {stage} ({}): {message}", .note_id.as_deref().unwrap_or("batch"))]
    Provider {
        stage: Stage,
        note_id: Option<String>,
        message: String,
    },

    /// Malformed input (blank id, bad threshold).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A resource with the same identity already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Zero notes were handed to an analysis run.
    #[error("Nothing to analyze: empty note batch")]
    EmptyBatch,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a batch-level provider error for `stage`.
    pub fn provider(stage: Stage, message: impl Into<String>) -> Self {
        Error::Provider {
            stage,
            note_id: None,
            message: message.into(),
        }
    }

    /// Attach the note id to a provider error. Other variants pass through.
    pub fn for_note(self, id: impl Into<String>) -> Self {
        match self {
            Error::Provider { stage, message, .. } => Error::Provider {
                stage,
                note_id: Some(id.into()),
                message,
            },
            other => other,
        }
    }

    /// Only transient provider failures are worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Provider { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            Error::ProviderUnavailable(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}
