//! # notescape-db
//!
//! Storage layer for notescape.
//!
//! This crate provides:
//! - An in-memory [`NoteStore`] with unordered-pair relationship reconciliation
//! - An in-memory [`VectorStore`] with exact cosine top-k queries
//! - The [`Database`] bundle handed to the HTTP layer
//!
//! ## Example
//!
//! ```rust,ignore
//! use notescape_db::Database;
//! use notescape_core::{NewNote, NoteStore};
//!
//! let db = Database::in_memory();
//! let id = db.notes.create(NewNote {
//!     title: "Paris".to_string(),
//!     content: "Notes from the trip.".to_string(),
//!     ..Default::default()
//! }).await?;
//! let graph = db.graph_data().await?;
//! ```

pub mod notes;
pub mod vectors;

use std::sync::Arc;

use notescape_graph::GraphAssembler;

pub use notes::InMemoryNoteStore;
pub use vectors::InMemoryVectorStore;

// Re-export core types
pub use notescape_core::{
    Error, GraphData, Metadata, NewNote, Note, NoteStore, Relationship, Result, VectorMatch,
    VectorStore,
};

/// Note and vector stores bundled together.
#[derive(Clone)]
pub struct Database {
    /// Note and relationship storage.
    pub notes: Arc<dyn NoteStore>,
    /// Embedding index.
    pub vectors: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    pub fn new(notes: Arc<dyn NoteStore>, vectors: Arc<dyn VectorStore>) -> Self {
        Self { notes, vectors }
    }

    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryNoteStore::new()),
            Arc::new(InMemoryVectorStore::new()),
        )
    }

    /// Delete a note, its relationships and its indexed vector.
    pub async fn delete_note(&self, id: &str) -> Result<bool> {
        let removed = self.notes.delete(id).await?;
        self.vectors.delete(id).await?;
        Ok(removed)
    }

    /// Full visualization graph over every stored note.
    pub async fn graph_data(&self) -> Result<GraphData> {
        GraphAssembler::new()
            .assemble_from_store(self.notes.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notescape_core::RelationshipType;

    fn new_note(id: &str) -> NewNote {
        NewNote {
            id: Some(id.to_string()),
            title: id.to_uppercase(),
            content: format!("content of {}", id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_graph_data_collapses_pair() {
        let db = Database::in_memory();
        for id in ["b", "a", "c"] {
            db.notes.create(new_note(id)).await.unwrap();
        }
        db.notes
            .upsert_relationship(
                Relationship::new("b", "a", RelationshipType::SharedTopics, 0.3).unwrap(),
            )
            .await
            .unwrap();
        db.notes
            .upsert_relationship(
                Relationship::new("a", "b", RelationshipType::SemanticSimilarity, 0.8).unwrap(),
            )
            .await
            .unwrap();

        let graph = db.graph_data().await.unwrap();
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.links.len(), 1);
        let link = &graph.links[0];
        assert_eq!((link.source.as_str(), link.target.as_str()), ("a", "b"));
        assert_eq!(link.kind, RelationshipType::SemanticSimilarity);
    }

    #[tokio::test]
    async fn test_delete_note_removes_vector() {
        let db = Database::in_memory();
        db.notes.create(new_note("a")).await.unwrap();
        db.vectors
            .upsert("a", vec![1.0, 0.0], Metadata::new())
            .await
            .unwrap();

        assert!(db.delete_note("a").await.unwrap());
        assert!(db.vectors.query(&[1.0, 0.0], 5).await.unwrap().is_empty());
        assert!(db.graph_data().await.unwrap().nodes.is_empty());
    }
}
