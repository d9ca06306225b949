//! Ollama embedding backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use notescape_core::{defaults, EmbeddingBackend, Error, Result, Stage, Vector};

use crate::config::OllamaConfig;
use crate::http;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::EMBED_MODEL;

/// Default embedding dimension for nomic-embed-text.
pub const DEFAULT_DIMENSION: usize = defaults::EMBED_DIMENSION;

/// Ollama embedding backend.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    embed_model: String,
    dimension: usize,
}

impl std::fmt::Debug for OllamaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaBackend")
            .field("base_url", &self.base_url)
            .field("embed_model", &self.embed_model)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Result<Self> {
        Self::from_config(&OllamaConfig::default())
    }

    /// Create a new Ollama backend from configuration.
    pub fn from_config(config: &OllamaConfig) -> Result<Self> {
        let client = http::build_client(config.timeout_secs)?;

        info!(
            "Initializing Ollama backend: url={}, embed={}",
            config.base_url, config.embedding_model
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embedding_model.clone(),
            dimension: config.dimension,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether the Ollama daemon answers.
    pub async fn health_check(&self) -> Result<bool> {
        Ok(http::probe(&self.client, &format!("{}/api/tags", self.base_url), "ollama").await)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "ollama", op = "embed_texts", model = %self.embed_model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: &self.embed_model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| http::send_error(Stage::Embedding, "ollama", &self.base_url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(http::status_error(Stage::Embedding, "ollama", status, &body));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            Error::provider(
                Stage::Embedding,
                format!("Failed to parse Ollama response: {}", e),
            )
        })?;

        if result.embeddings.len() != texts.len() {
            return Err(Error::provider(
                Stage::Embedding,
                format!(
                    "Ollama returned {} embeddings for {} inputs",
                    result.embeddings.len(),
                    texts.len()
                ),
            ));
        }

        let vectors: Vec<Vector> = result.embeddings;
        let elapsed = start.elapsed().as_millis() as u64;

        debug!(
            result_count = vectors.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > defaults::SLOW_EMBED_MS {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.embed_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Constants Tests
    // ==========================================================================

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_OLLAMA_URL, "http://127.0.0.1:11434");
        assert_eq!(DEFAULT_EMBED_MODEL, "nomic-embed-text");
        assert_eq!(DEFAULT_DIMENSION, 768);
    }

    // ==========================================================================
    // Backend Configuration Tests
    // ==========================================================================

    #[test]
    fn test_default_config() {
        let backend = OllamaBackend::new().unwrap();
        assert_eq!(backend.base_url(), DEFAULT_OLLAMA_URL);
        assert_eq!(backend.model_name(), DEFAULT_EMBED_MODEL);
        assert_eq!(backend.dimension(), DEFAULT_DIMENSION);
    }

    #[test]
    fn test_custom_config_strips_trailing_slash() {
        let config = OllamaConfig {
            base_url: "http://gpu-box:11434/".to_string(),
            embedding_model: "mxbai-embed-large".to_string(),
            dimension: 1024,
            ..Default::default()
        };
        let backend = OllamaBackend::from_config(&config).unwrap();
        assert_eq!(backend.base_url(), "http://gpu-box:11434");
        assert_eq!(backend.model_name(), "mxbai-embed-large");
        assert_eq!(backend.dimension(), 1024);
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let config = OllamaConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let backend = OllamaBackend::from_config(&config).unwrap();
        let vectors = backend.embed_texts(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    // ==========================================================================
    // Wire Format Tests
    // ==========================================================================

    #[test]
    fn test_embedding_request_serialization() {
        let input = ["hello".to_string(), "world".to_string()];
        let request = EmbeddingRequest {
            model: "nomic-embed-text",
            input: &input,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["input"][1], "world");
    }

    #[test]
    fn test_embedding_response_deserialization() {
        let json = r#"{"model":"nomic-embed-text","embeddings":[[0.1,0.2],[0.3,0.4]]}"#;
        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[1], vec![0.3, 0.4]);
    }
}
