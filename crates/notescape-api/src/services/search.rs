//! Semantic search with a text fallback.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use notescape_core::{EmbeddingBackend, Error, Note, Result, Stage};
use notescape_db::Database;

/// How results were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Semantic,
    Text,
}

/// One search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Cosine score for semantic hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub mode: SearchMode,
    pub results: Vec<SearchHit>,
}

pub struct SearchService {
    db: Database,
    embedder: Option<Arc<dyn EmbeddingBackend>>,
}

impl SearchService {
    pub fn new(db: Database, embedder: Option<Arc<dyn EmbeddingBackend>>) -> Self {
        Self { db, embedder }
    }

    /// Search notes for `query`.
    ///
    /// Embeds the query and ranks indexed notes by cosine score. Without an
    /// embedding backend, or before anything has been indexed, falls back to
    /// case-insensitive text search.
    #[instrument(skip(self, query), fields(subsystem = "api", component = "search_service", op = "search"))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("search query cannot be empty".to_string()));
        }

        if let Some(embedder) = &self.embedder {
            let hits = self.semantic(embedder.as_ref(), query, limit).await?;
            if !hits.is_empty() {
                return Ok(SearchResults {
                    mode: SearchMode::Semantic,
                    results: hits,
                });
            }
            debug!("Vector index empty, falling back to text search");
        }

        let results = self
            .db
            .notes
            .search_text(query, limit)
            .await?
            .into_iter()
            .map(|note| hit(note, None))
            .collect();
        Ok(SearchResults {
            mode: SearchMode::Text,
            results,
        })
    }

    async fn semantic(
        &self,
        embedder: &dyn EmbeddingBackend,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let mut vectors = embedder.embed_texts(&[query.to_string()]).await?;
        let vector = vectors
            .pop()
            .ok_or_else(|| Error::provider(Stage::Embedding, "no vector returned for query"))?;

        let matches = self.db.vectors.query(&vector, limit).await?;
        let mut hits = Vec::with_capacity(matches.len());
        for m in matches {
            // Index entries can outlive their note until the next analysis run.
            if let Some(note) = self.db.notes.get(&m.id).await? {
                hits.push(hit(note, Some(m.score)));
            }
        }
        Ok(hits)
    }
}

fn hit(note: Note, score: Option<f32>) -> SearchHit {
    SearchHit {
        id: note.id,
        title: note.title,
        content: note.content,
        score,
    }
}
