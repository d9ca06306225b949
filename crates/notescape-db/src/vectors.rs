//! In-memory vector store with exact cosine search.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{instrument, trace};

use notescape_core::{cosine_similarity, Metadata, Result, Vector, VectorMatch, VectorStore};

#[derive(Debug, Clone)]
struct StoredVector {
    vector: Vector,
    metadata: Metadata,
}

/// Vector index held in process memory. Queries scan every entry.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, StoredVector>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, id: &str, vector: Vector, metadata: Metadata) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(id.to_string(), StoredVector { vector, metadata });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(id).is_some())
    }

    #[instrument(skip(self, vector), fields(subsystem = "db", component = "vectors", op = "query"))]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().await;
        let mut matches: Vec<VectorMatch> = entries
            .iter()
            .map(|(id, stored)| VectorMatch {
                id: id.clone(),
                score: cosine_similarity(vector, &stored.vector),
                metadata: stored.metadata.clone(),
            })
            .collect();

        // Ties broken by id so results do not depend on map iteration order.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);

        trace!(candidates = entries.len(), returned = matches.len(), "Vector query");
        Ok(matches)
    }
}
