//! Core traits for notescape abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;
use crate::similarity::{cosine_similarity, pairwise_similarity, SimilarityMatrix};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns one vector per input text, in input order. Either every text
    /// is embedded or the whole call fails.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Cosine similarity between two embeddings.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }

    /// Pairwise similarity matrix over a set of embeddings.
    fn pairwise_similarity(&self, vectors: &[Vector]) -> SimilarityMatrix {
        pairwise_similarity(vectors)
    }
}

/// Backend for named entity recognition.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Extract named entities from text. Deterministic for a fixed text and model.
    async fn extract(&self, text: &str) -> Result<Vec<Entity>>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// STORE TRAITS
// =============================================================================

/// Note store contract (graph database or equivalent).
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a note, returning its id.
    async fn create(&self, note: NewNote) -> Result<String>;

    /// Fetch a note by id.
    async fn get(&self, id: &str) -> Result<Option<Note>>;

    /// Every stored note.
    async fn list_all(&self) -> Result<Vec<Note>>;

    /// Delete a note and its relationships. Returns false if it did not exist.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Insert or reconcile an edge by unordered pair + relationship type.
    async fn upsert_relationship(&self, edge: Relationship) -> Result<String>;

    /// Every edge touching the note, in either direction.
    async fn relationships_for(&self, id: &str) -> Result<Vec<Relationship>>;

    /// Case-insensitive substring search over title and content.
    async fn search_text(&self, query: &str, limit: usize) -> Result<Vec<Note>>;
}

/// Vector store contract: a downstream index of note embeddings.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store or replace the vector for `id`.
    async fn upsert(&self, id: &str, vector: Vector, metadata: Metadata) -> Result<()>;

    /// Remove the vector for `id`. Returns false if absent.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Top-k most similar stored vectors, highest score first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>>;
}
