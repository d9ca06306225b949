//! GLiNER NER backend for zero-shot named entity recognition.
//!
//! GLiNER is a small BERT-based model served by an HTTP sidecar. This module
//! provides a client for that sidecar that implements [`EntityExtractor`].
//!
//! # Configuration
//!
//! - `GLINER_BASE_URL`: Base URL of the GLiNER sidecar. Unset or empty disables GLiNER.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use notescape_core::{defaults, Entity, EntityExtractor, Error, Result, Stage};

use crate::config::GlinerConfig;
use crate::http;

/// A named entity as returned by the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NerEntity {
    /// The entity text as it appears in the source.
    pub text: String,
    /// The entity type label (e.g., "organization", "person").
    pub label: String,
    /// Confidence score from the NER model (0.0-1.0).
    pub score: f32,
    /// Character start offset in the source text.
    pub start: usize,
    /// Character end offset in the source text.
    pub end: usize,
}

impl From<NerEntity> for Entity {
    fn from(e: NerEntity) -> Self {
        Entity::new(e.text, e.label, e.start, e.end)
    }
}

/// Result of NER extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerResult {
    /// Extracted entities.
    pub entities: Vec<NerEntity>,
    /// Model name used for extraction.
    #[serde(default)]
    pub model: String,
    /// Length of the text that was processed.
    #[serde(default)]
    pub text_length: usize,
}

/// GLiNER sidecar client.
pub struct GlinerBackend {
    base_url: String,
    client: Client,
    entity_types: Vec<String>,
    threshold: Option<f32>,
}

impl GlinerBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&GlinerConfig {
            base_url: base_url.into(),
            threshold: Some(defaults::GLINER_THRESHOLD),
            entity_types: Vec::new(),
            timeout_secs: defaults::NER_TIMEOUT_SECS,
        })
    }

    pub fn from_config(config: &GlinerConfig) -> Result<Self> {
        let entity_types = if config.entity_types.is_empty() {
            defaults::NER_ENTITY_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            config.entity_types.clone()
        };

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: http::build_client(config.timeout_secs)?,
            entity_types,
            threshold: config.threshold,
        })
    }

    /// Labels requested on every call.
    pub fn entity_types(&self) -> &[String] {
        &self.entity_types
    }

    /// Check whether the sidecar reports itself healthy.
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => {
                if resp.status().is_success() {
                    if let Ok(health) = resp.json::<HealthResponse>().await {
                        return Ok(health.status == "healthy");
                    }
                }
                Ok(false)
            }
            Err(_) => Ok(false),
        }
    }
}

/// Request payload for the GLiNER `/extract` endpoint.
#[derive(Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
    entity_types: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f32>,
}

/// Health check response from GLiNER.
#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

#[async_trait]
impl EntityExtractor for GlinerBackend {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "gliner", op = "extract", text_len = text.len()))]
    async fn extract(&self, text: &str) -> Result<Vec<Entity>> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/extract", self.base_url);
        let request = ExtractRequest {
            text,
            entity_types: &self.entity_types,
            threshold: self.threshold,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| http::send_error(Stage::EntityExtraction, "gliner", &self.base_url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(http::status_error(
                Stage::EntityExtraction,
                "gliner",
                status,
                &body,
            ));
        }

        let result: NerResult = response.json().await.map_err(|e| {
            Error::provider(
                Stage::EntityExtraction,
                format!("Failed to parse GLiNER response: {}", e),
            )
        })?;

        let mut entities: Vec<Entity> = result.entities.into_iter().map(Entity::from).collect();
        entities.sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));

        debug!(result_count = entities.len(), "Entity extraction complete");
        Ok(entities)
    }

    fn model_name(&self) -> &str {
        "gliner"
    }
}
