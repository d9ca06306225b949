//! Provider resolution.
//!
//! Turns an [`InferenceConfig`] into concrete backends using one explicit,
//! ordered policy. The decision and the reason for it are returned to the
//! caller and logged once, instead of being rediscovered inside the pipeline.
//!
//! `Auto` policy, in order:
//! 1. OpenAI-compatible remote provider, if a non-blank API key is configured.
//! 2. Ollama, if enabled.
//! 3. Nothing: the caller falls back to keyword overlap.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use notescape_core::{EmbeddingBackend, EntityExtractor, Error, Result};

use crate::config::{EmbeddingPreference, EmbeddingProviderKind, InferenceConfig, NerProviderKind};
use crate::gliner::GlinerBackend;
use crate::ollama::OllamaBackend;
use crate::openai::OpenAIBackend;
use crate::rule_ner::RuleBasedExtractor;

/// A provider that was considered and passed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedProvider {
    pub provider: EmbeddingProviderKind,
    pub reason: String,
}

/// Outcome of embedding provider resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSelection {
    pub provider: EmbeddingProviderKind,
    pub model: String,
    pub reason: String,
    pub rejected: Vec<RejectedProvider>,
}

/// A resolved embedding backend and why it was picked.
#[derive(Clone)]
pub struct ResolvedEmbedding {
    pub backend: Arc<dyn EmbeddingBackend>,
    pub selection: ProviderSelection,
}

impl std::fmt::Debug for ResolvedEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEmbedding")
            .field("selection", &self.selection)
            .finish()
    }
}

/// Applies the provider selection policy to a configuration.
#[derive(Debug, Clone)]
pub struct ProviderResolver {
    config: InferenceConfig,
}

impl ProviderResolver {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Decide which embedding provider to use, without building it.
    ///
    /// `Ok(None)` means no embedding provider is usable and analysis should
    /// use keyword overlap. An explicit preference that cannot be honoured is
    /// a configuration error.
    pub fn select_embedding(&self) -> Result<Option<ProviderSelection>> {
        let openai_usable = self
            .config
            .openai
            .as_ref()
            .map(|c| c.has_credential())
            .unwrap_or(false);
        let ollama_usable = self
            .config
            .ollama
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false);

        match self.config.embedding {
            EmbeddingPreference::Disabled => {
                debug!(subsystem = "inference", "Embeddings disabled by configuration");
                Ok(None)
            }
            EmbeddingPreference::OpenAI => {
                if !openai_usable {
                    return Err(Error::Config(
                        "OpenAI embeddings requested but no API key is configured".to_string(),
                    ));
                }
                Ok(Some(self.selection(
                    EmbeddingProviderKind::OpenAI,
                    "explicitly configured",
                    Vec::new(),
                )))
            }
            EmbeddingPreference::Ollama => {
                if !ollama_usable {
                    return Err(Error::Config(
                        "Ollama embeddings requested but Ollama is disabled".to_string(),
                    ));
                }
                Ok(Some(self.selection(
                    EmbeddingProviderKind::Ollama,
                    "explicitly configured",
                    Vec::new(),
                )))
            }
            EmbeddingPreference::Auto => {
                let mut rejected = Vec::new();

                if openai_usable {
                    return Ok(Some(self.selection(
                        EmbeddingProviderKind::OpenAI,
                        "API key present",
                        rejected,
                    )));
                }
                rejected.push(RejectedProvider {
                    provider: EmbeddingProviderKind::OpenAI,
                    reason: "no API key configured".to_string(),
                });

                if ollama_usable {
                    return Ok(Some(self.selection(
                        EmbeddingProviderKind::Ollama,
                        "local provider enabled",
                        rejected,
                    )));
                }
                rejected.push(RejectedProvider {
                    provider: EmbeddingProviderKind::Ollama,
                    reason: "disabled".to_string(),
                });

                debug!(
                    subsystem = "inference",
                    rejected = ?rejected,
                    "No embedding provider usable"
                );
                Ok(None)
            }
        }
    }

    /// Build the selected embedding backend.
    pub fn resolve_embedding(&self) -> Result<Option<ResolvedEmbedding>> {
        let selection = match self.select_embedding()? {
            Some(selection) => selection,
            None => return Ok(None),
        };

        let backend: Arc<dyn EmbeddingBackend> = match selection.provider {
            EmbeddingProviderKind::OpenAI => {
                let config = self.config.openai.clone().ok_or_else(|| {
                    Error::Config("OpenAI selected but not configured".to_string())
                })?;
                Arc::new(OpenAIBackend::new(config)?)
            }
            EmbeddingProviderKind::Ollama => {
                let config = self.config.ollama.as_ref().ok_or_else(|| {
                    Error::Config("Ollama selected but not configured".to_string())
                })?;
                Arc::new(OllamaBackend::from_config(config)?)
            }
        };

        info!(
            subsystem = "inference",
            provider = %selection.provider,
            model = %selection.model,
            reason = %selection.reason,
            "Embedding provider selected"
        );

        Ok(Some(ResolvedEmbedding { backend, selection }))
    }

    /// Build the configured entity extractor.
    pub fn build_entity_extractor(&self) -> Result<Arc<dyn EntityExtractor>> {
        match self.config.ner.provider {
            NerProviderKind::Rules => Ok(Arc::new(RuleBasedExtractor::new())),
            NerProviderKind::Gliner => {
                let config = self.config.ner.gliner.as_ref().ok_or_else(|| {
                    Error::Config("GLiNER selected but GLINER_BASE_URL is not set".to_string())
                })?;
                info!(
                    subsystem = "inference",
                    component = "gliner",
                    base_url = %config.base_url,
                    "Entity extractor selected"
                );
                Ok(Arc::new(GlinerBackend::from_config(config)?))
            }
        }
    }

    fn selection(
        &self,
        provider: EmbeddingProviderKind,
        reason: &str,
        rejected: Vec<RejectedProvider>,
    ) -> ProviderSelection {
        let model = match provider {
            EmbeddingProviderKind::OpenAI => self
                .config
                .openai
                .as_ref()
                .map(|c| c.embedding_model.clone()),
            EmbeddingProviderKind::Ollama => self
                .config
                .ollama
                .as_ref()
                .map(|c| c.embedding_model.clone()),
        }
        .unwrap_or_default();

        ProviderSelection {
            provider,
            model,
            reason: reason.to_string(),
            rejected,
        }
    }
}
