//! In-memory note store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use notescape_core::{
    Error, NewNote, Note, NoteStore, PairKey, Relationship, RelationshipType, Result,
};

#[derive(Debug, Clone)]
struct StoredRelationship {
    id: String,
    edge: Relationship,
}

#[derive(Debug, Default)]
struct State {
    notes: HashMap<String, Note>,
    /// Insertion order of note ids.
    order: Vec<String>,
    relationships: BTreeMap<(PairKey, RelationshipType), StoredRelationship>,
}

/// Note store backed by process memory.
///
/// Relationships are keyed by unordered pair and type, so concurrent analysis
/// runs writing the same edge converge on a single stored relationship.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    state: RwLock<State>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn note_count(&self) -> usize {
        self.state.read().await.notes.len()
    }

    pub async fn relationship_count(&self) -> usize {
        self.state.read().await.relationships.len()
    }

    /// Every stored relationship, ordered by pair then type.
    pub async fn list_relationships(&self) -> Vec<Relationship> {
        self.state
            .read()
            .await
            .relationships
            .values()
            .map(|stored| stored.edge.clone())
            .collect()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    #[instrument(skip(self, note), fields(subsystem = "db", component = "notes", op = "create"))]
    async fn create(&self, note: NewNote) -> Result<String> {
        let note = note.into_note();
        if note.id.trim().is_empty() {
            return Err(Error::InvalidInput("note id cannot be blank".to_string()));
        }

        let mut state = self.state.write().await;
        if state.notes.contains_key(&note.id) {
            return Err(Error::Conflict(format!(
                "note already exists: {}",
                note.id
            )));
        }

        let id = note.id.clone();
        state.order.push(id.clone());
        state.notes.insert(id.clone(), note);
        debug!(note_id = %id, "Note created");
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Note>> {
        Ok(self.state.read().await.notes.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Note>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.notes.get(id).cloned())
            .collect())
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "notes", op = "delete"))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.notes.remove(id).is_none() {
            return Ok(false);
        }
        state.order.retain(|existing| existing != id);

        let before = state.relationships.len();
        state
            .relationships
            .retain(|(pair, _), _| pair.low() != id && pair.high() != id);
        debug!(
            note_id = %id,
            removed_relationships = before - state.relationships.len(),
            "Note deleted"
        );
        Ok(true)
    }

    async fn upsert_relationship(&self, edge: Relationship) -> Result<String> {
        let mut state = self.state.write().await;

        for endpoint in [&edge.source_id, &edge.target_id] {
            if !state.notes.contains_key(endpoint) {
                return Err(Error::NoteNotFound(endpoint.clone()));
            }
        }

        let key = (edge.pair_key(), edge.relationship_type);
        match state.relationships.get_mut(&key) {
            Some(stored) => {
                stored.edge.absorb(edge);
                Ok(stored.id.clone())
            }
            None => {
                let id = Uuid::now_v7().to_string();
                state.relationships.insert(
                    key,
                    StoredRelationship {
                        id: id.clone(),
                        edge,
                    },
                );
                Ok(id)
            }
        }
    }

    async fn relationships_for(&self, id: &str) -> Result<Vec<Relationship>> {
        let state = self.state.read().await;
        Ok(state
            .relationships
            .values()
            .filter(|stored| stored.edge.touches(id))
            .map(|stored| stored.edge.clone())
            .collect())
    }

    async fn search_text(&self, query: &str, limit: usize) -> Result<Vec<Note>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.notes.get(id))
            .filter(|note| {
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notescape_core::SHARED_KEYWORDS_KEY;
    use serde_json::json;

    fn new_note(id: &str, title: &str, content: &str) -> NewNote {
        NewNote {
            id: Some(id.to_string()),
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    async fn seeded() -> InMemoryNoteStore {
        let store = InMemoryNoteStore::new();
        store.create(new_note("a", "Alpha", "first note")).await.unwrap();
        store.create(new_note("b", "Beta", "second note")).await.unwrap();
        store.create(new_note("c", "Gamma", "third entry")).await.unwrap();
        store
    }

    fn edge(a: &str, b: &str, kind: RelationshipType, strength: f32) -> Relationship {
        Relationship::new(a, b, kind, strength).unwrap()
    }

    // ==========================================================================
    // Notes
    // ==========================================================================

    #[tokio::test]
    async fn test_create_and_get() {
        let store = seeded().await;
        let note = store.get("a").await.unwrap().unwrap();
        assert_eq!(note.title, "Alpha");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_generates_id() {
        let store = InMemoryNoteStore::new();
        let id = store
            .create(NewNote {
                title: "t".to_string(),
                content: "c".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!id.is_empty());
        assert!(store.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_duplicate_rejected() {
        let store = seeded().await;
        let err = store.create(new_note("a", "again", "x")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(msg) if msg.ends_with(": a")));
    }

    #[tokio::test]
    async fn test_list_all_keeps_insertion_order() {
        let store = seeded().await;
        let ids: Vec<String> = store.list_all().await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_search_text_case_insensitive() {
        let store = seeded().await;
        let hits = store.search_text("NOTE", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        let hits = store.search_text("gamma", 10).await.unwrap();
        assert_eq!(hits[0].id, "c");
        assert_eq!(store.search_text("note", 1).await.unwrap().len(), 1);
        assert!(store.search_text("  ", 10).await.unwrap().is_empty());
    }

    // ==========================================================================
    // Relationships
    // ==========================================================================

    #[tokio::test]
    async fn test_upsert_reconciles_mirror_edges() {
        let store = seeded().await;
        let first = store
            .upsert_relationship(
                edge("a", "b", RelationshipType::SharedTopics, 0.2)
                    .with_metadata(SHARED_KEYWORDS_KEY, json!(["cat", "mat"])),
            )
            .await
            .unwrap();
        let second = store
            .upsert_relationship(
                edge("b", "a", RelationshipType::SharedTopics, 0.3)
                    .with_metadata(SHARED_KEYWORDS_KEY, json!(["mat", "sat"])),
            )
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.relationship_count().await, 1);

        let stored = &store.relationships_for("a").await.unwrap()[0];
        assert!((stored.strength - 0.3).abs() < 1e-6);
        assert_eq!(stored.shared_keywords(), vec!["cat", "mat", "sat"]);
    }

    #[tokio::test]
    async fn test_upsert_different_types_coexist() {
        let store = seeded().await;
        store
            .upsert_relationship(edge("a", "b", RelationshipType::SharedTopics, 0.2))
            .await
            .unwrap();
        store
            .upsert_relationship(edge("a", "b", RelationshipType::SemanticSimilarity, 0.7))
            .await
            .unwrap();
        assert_eq!(store.relationship_count().await, 2);
    }

    #[tokio::test]
    async fn test_upsert_unknown_endpoint() {
        let store = seeded().await;
        let err = store
            .upsert_relationship(edge("a", "zzz", RelationshipType::SharedTopics, 0.2))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoteNotFound(id) if id == "zzz"));
    }

    #[tokio::test]
    async fn test_relationships_for_either_direction() {
        let store = seeded().await;
        store
            .upsert_relationship(edge("a", "b", RelationshipType::SharedEntities, 0.2))
            .await
            .unwrap();
        assert_eq!(store.relationships_for("b").await.unwrap().len(), 1);
        assert!(store.relationships_for("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = seeded().await;
        store
            .upsert_relationship(edge("a", "b", RelationshipType::SharedEntities, 0.2))
            .await
            .unwrap();
        store
            .upsert_relationship(edge("b", "c", RelationshipType::SharedEntities, 0.2))
            .await
            .unwrap();

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert_eq!(store.note_count().await, 2);
        assert_eq!(store.relationship_count().await, 1);
        assert!(store.relationships_for("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_converge() {
        let store = std::sync::Arc::new(seeded().await);
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let (a, b) = if i % 2 == 0 { ("a", "b") } else { ("b", "a") };
                store
                    .upsert_relationship(edge(a, b, RelationshipType::SharedTopics, 0.1 * i as f32))
                    .await
                    .unwrap()
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.relationship_count().await, 1);
        let stored = &store.list_relationships().await[0];
        assert!((stored.strength - 0.7).abs() < 1e-6);
    }
}
