//! Classification of failed `/embeddings` responses.

use reqwest::StatusCode;

use notescape_core::{Error, Stage};

use super::types::ErrorBody;

/// Why the endpoint refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Key missing, wrong or lacking access.
    Auth,
    RateLimited,
    UnknownModel,
    /// An input exceeded the model's context window.
    InputTooLong,
    Server,
    Other,
}

impl FailureKind {
    /// Classify by status first, then by the error code the body carries.
    pub fn classify(status: StatusCode, body: &ErrorBody) -> Self {
        let code = body.code.as_deref().unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::NOT_FOUND => Self::UnknownModel,
            _ if code == "model_not_found" => Self::UnknownModel,
            _ if code == "invalid_api_key" => Self::Auth,
            StatusCode::BAD_REQUEST if code.contains("context_length") || body.kind.contains("context_length") => {
                Self::InputTooLong
            }
            s if s.is_server_error() => Self::Server,
            _ => Self::Other,
        }
    }

    /// Map onto the shared taxonomy. Only throttling, server faults and
    /// unrecognized failures are worth retrying.
    pub fn into_error(self, message: String) -> Error {
        match self {
            Self::Auth => Error::ProviderUnavailable(format!("openai rejected credentials: {}", message)),
            Self::UnknownModel => Error::Config(format!("Unknown embedding model: {}", message)),
            Self::InputTooLong => Error::InvalidInput(format!("Input exceeds model context: {}", message)),
            Self::RateLimited => Error::provider(Stage::Embedding, format!("openai rate limited: {}", message)),
            Self::Server | Self::Other => Error::provider(Stage::Embedding, message),
        }
    }
}

/// Turn a non-2xx response into an error.
pub fn response_error(status: StatusCode, raw_body: &str) -> Error {
    let body = ErrorBody::from_raw(status, raw_body);
    FailureKind::classify(status, &body)
        .into_error(format!("openai returned {}: {}", status, body.message))
}
