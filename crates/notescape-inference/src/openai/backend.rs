//! OpenAI-compatible embedding backend.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use notescape_core::{defaults, EmbeddingBackend, Error, Result, Stage, Vector};

use super::error::response_error;
use super::types::*;
use crate::config::OpenAIConfig;
use crate::http;

/// Default OpenAI API URL.
pub const DEFAULT_OPENAI_URL: &str = defaults::OPENAI_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::OPENAI_EMBED_MODEL;

/// Default embedding dimension for text-embedding-3-small.
pub const DEFAULT_DIMENSION: usize = defaults::OPENAI_EMBED_DIMENSION;

/// OpenAI-compatible embedding backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl std::fmt::Debug for OpenAIBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIBackend")
            .field("base_url", &self.config.base_url)
            .field("embedding_model", &self.config.embedding_model)
            .field("has_api_key", &self.config.has_credential())
            .finish()
    }
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(config.timeout_secs)?;

        info!(
            "Initializing OpenAI backend: url={}, embed={}",
            config.base_url, config.embedding_model
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    /// Embed one sub-batch. Returned vectors follow `texts` order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let request = EmbeddingRequest::new(&self.config.embedding_model, texts);

        let response = self
            .build_request("/embeddings")
            .json(&request)
            .send()
            .await
            .map_err(|e| http::send_error(Stage::Embedding, "openai", &self.config.base_url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(response_error(status, &body));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            Error::provider(
                Stage::Embedding,
                format!("Failed to parse OpenAI response: {}", e),
            )
        })?;

        if result.data.len() != texts.len() {
            return Err(Error::provider(
                Stage::Embedding,
                format!(
                    "OpenAI returned {} embeddings for {} inputs",
                    result.data.len(),
                    texts.len()
                ),
            ));
        }

        // The API does not promise response order
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        if data.iter().enumerate().any(|(i, d)| d.index != i) {
            return Err(Error::provider(
                Stage::Embedding,
                "OpenAI returned embeddings with unexpected indices",
            ));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAIBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "openai", op = "embed_texts", model = %self.config.embedding_model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let batch_size = self.config.batch_size.max(1);
        let mut vectors = Vec::with_capacity(texts.len());

        // Any failed sub-batch fails the whole call; partial results are dropped.
        for (batch_index, chunk) in texts.chunks(batch_size).enumerate() {
            debug!(
                batch_index,
                batch_len = chunk.len(),
                "Embedding sub-batch"
            );
            vectors.extend(self.embed_batch(chunk).await?);
        }

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
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> OpenAIConfig {
        OpenAIConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_OPENAI_URL, "https://api.openai.com/v1");
        assert_eq!(DEFAULT_EMBED_MODEL, "text-embedding-3-small");
        assert_eq!(DEFAULT_DIMENSION, 1536);
    }

    #[test]
    fn test_backend_creation() {
        let backend = OpenAIBackend::new(config_with_key()).unwrap();
        assert_eq!(backend.config().batch_size, defaults::OPENAI_EMBED_BATCH_SIZE);
    }

    #[test]
    fn test_backend_rejects_invalid_config() {
        let config = OpenAIConfig {
            base_url: "api.openai.com".to_string(),
            ..config_with_key()
        };
        let err = OpenAIBackend::new(config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_dimension_and_model_accessors() {
        let config = OpenAIConfig {
            embedding_model: "text-embedding-3-large".to_string(),
            dimension: 3072,
            ..config_with_key()
        };
        let backend = OpenAIBackend::new(config).unwrap();
        assert_eq!(backend.dimension(), 3072);
        assert_eq!(backend.model_name(), "text-embedding-3-large");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let backend = OpenAIBackend::new(config_with_key()).unwrap();
        let debug = format!("{:?}", backend);
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("has_api_key: true"));
    }
}
