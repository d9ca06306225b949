//! # notescape-inference
//!
//! Embedding and entity extraction backends for notescape.
//!
//! This crate provides:
//! - Ollama and OpenAI-compatible embedding backends
//! - GLiNER sidecar and rule-based entity extractors
//! - Inference configuration and the provider resolution policy
//!
//! # Example
//!
//! ```ignore
//! use notescape_inference::{InferenceConfig, ProviderResolver};
//!
//! let resolver = ProviderResolver::new(InferenceConfig::load()?);
//! let embedding = resolver.resolve_embedding()?;
//! let extractor = resolver.build_entity_extractor()?;
//! ```

pub mod config;
pub mod gliner;
mod http;
pub mod ollama;
pub mod openai;
pub mod resolver;
pub mod rule_ner;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{
    ConfigError, EmbeddingPreference, EmbeddingProviderKind, GlinerConfig, InferenceConfig,
    NerConfig, NerProviderKind, OllamaConfig, OpenAIConfig,
};
pub use gliner::GlinerBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAIBackend;
pub use resolver::{ProviderResolver, ProviderSelection, RejectedProvider, ResolvedEmbedding};
pub use rule_ner::RuleBasedExtractor;

// Re-export core traits for convenience
pub use notescape_core::{EmbeddingBackend, EntityExtractor};
