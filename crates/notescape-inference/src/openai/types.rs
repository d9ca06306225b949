//! Wire types for the `/embeddings` endpoint.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Request body. Borrows the caller's texts for the duration of one call.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
    pub encoding_format: &'static str,
}

impl<'a> EmbeddingRequest<'a> {
    pub fn new(model: &'a str, input: &'a [String]) -> Self {
        Self {
            model,
            input,
            encoding_format: "float",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub usage: Option<EmbeddingUsage>,
}

/// One vector, tagged with the position of its input.
#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingUsage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// `{"error": {...}}` body sent with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Parse a failed response body. Compatible servers often answer with
    /// plain text, which becomes the message verbatim.
    pub fn from_raw(status: StatusCode, raw: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(raw) {
            Ok(envelope) => envelope.error,
            Err(_) => Self {
                message: if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw.trim().to_string()
                },
                kind: String::new(),
                code: None,
            },
        }
    }
}
