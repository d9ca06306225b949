//! Shared application state.

use std::sync::Arc;

use tracing::{info, warn};

use notescape_core::{EmbeddingBackend, Result};
use notescape_db::Database;
use notescape_graph::{ExtractorConfig, RelationshipExtractor, Strategy};
use notescape_inference::{InferenceConfig, ProviderResolver, ProviderSelection};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub extractor: Arc<RelationshipExtractor>,
    /// Embedding backend used for semantic search (None falls back to text search).
    pub embedder: Option<Arc<dyn EmbeddingBackend>>,
    /// Why the embedding provider was chosen, reported by `/health`.
    pub selection: Option<ProviderSelection>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("extractor", &self.extractor)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State without an embedding backend.
    pub fn new(db: Database, extractor: RelationshipExtractor) -> Self {
        Self {
            db,
            extractor: Arc::new(extractor),
            embedder: None,
            selection: None,
        }
    }

    /// Use `backend` for semantic search. The extractor is configured separately.
    pub fn with_search_embeddings(
        mut self,
        backend: Arc<dyn EmbeddingBackend>,
        selection: Option<ProviderSelection>,
    ) -> Self {
        self.embedder = Some(backend);
        self.selection = selection;
        self
    }

    /// Resolve providers from configuration and wire them into the extractor.
    pub fn from_config(
        db: Database,
        inference: InferenceConfig,
        extractor_config: ExtractorConfig,
        strategy: Option<Strategy>,
    ) -> Result<Self> {
        let resolver = ProviderResolver::new(inference);
        let resolved = resolver.resolve_embedding()?;
        let ner = resolver.build_entity_extractor()?;

        let mut extractor =
            RelationshipExtractor::new(extractor_config)?.with_entity_extractor(ner);
        if let Some(strategy) = strategy {
            extractor = extractor.with_strategy(strategy);
        }

        match resolved {
            Some(resolved) => {
                info!(
                    provider = %resolved.selection.provider,
                    model = %resolved.selection.model,
                    reason = %resolved.selection.reason,
                    "Embedding provider selected"
                );
                let extractor = extractor.with_embeddings(resolved.backend.clone());
                Ok(Self::new(db, extractor)
                    .with_search_embeddings(resolved.backend, Some(resolved.selection)))
            }
            None => {
                warn!("No embedding provider configured, using keyword strategy and text search");
                Ok(Self::new(db, extractor))
            }
        }
    }
}
