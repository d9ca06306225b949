//! Edge accumulation with unordered-pair deduplication.
//!
//! An [`EdgeSet`] holds at most one edge per unordered pair and relationship
//! type. Edges keep the orientation they were first inserted with.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use notescape_core::{
    merge_metadata, Metadata, PairKey, Relationship, RelationshipType, SHARED_ENTITIES_KEY,
};

/// Ordered, deduplicated collection of relationship edges.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: Vec<Relationship>,
    index: HashMap<(PairKey, RelationshipType), usize>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Add an edge, or fold it into the existing edge with the same pair and type.
    ///
    /// Returns true if a new edge was created.
    pub fn insert(&mut self, edge: Relationship) -> bool {
        let key = (edge.pair_key(), edge.relationship_type);
        match self.index.get(&key) {
            Some(&i) => {
                self.edges[i].absorb(edge);
                false
            }
            None => {
                self.index.insert(key, self.edges.len());
                self.edges.push(edge);
                true
            }
        }
    }

    /// Existing edge for this pair and type, in either orientation.
    pub fn get(&self, a: &str, b: &str, kind: RelationshipType) -> Option<&Relationship> {
        self.index
            .get(&(PairKey::new(a, b), kind))
            .map(|&i| &self.edges[i])
    }

    /// Record shared entities on the pair's semantic edge, if there is one.
    ///
    /// Returns false when the pair has no semantic edge, in which case the
    /// caller creates a standalone `shared_entities` edge.
    pub fn attach_shared_entities(&mut self, a: &str, b: &str, shared: &[String]) -> bool {
        let key = (PairKey::new(a, b), RelationshipType::SemanticSimilarity);
        match self.index.get(&key) {
            Some(&i) => {
                let list = shared.iter().cloned().map(JsonValue::String).collect();
                let mut incoming = Metadata::new();
                incoming.insert(SHARED_ENTITIES_KEY.to_string(), JsonValue::Array(list));
                merge_metadata(&mut self.edges[i].metadata, incoming);
                true
            }
            None => false,
        }
    }

    /// Edges in insertion order.
    pub fn into_vec(self) -> Vec<Relationship> {
        self.edges
    }
}

impl Extend<Relationship> for EdgeSet {
    fn extend<I: IntoIterator<Item = Relationship>>(&mut self, iter: I) {
        for edge in iter {
            self.insert(edge);
        }
    }
}

impl FromIterator<Relationship> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Relationship>>(iter: I) -> Self {
        let mut set = EdgeSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edge(a: &str, b: &str, kind: RelationshipType, strength: f32) -> Relationship {
        Relationship::new(a, b, kind, strength).unwrap()
    }

    #[test]
    fn test_mirror_edge_is_deduplicated() {
        let mut set = EdgeSet::new();
        assert!(set.insert(edge("a", "b", RelationshipType::SemanticSimilarity, 0.7)));
        assert!(!set.insert(edge("b", "a", RelationshipType::SemanticSimilarity, 0.8)));

        assert_eq!(set.len(), 1);
        let kept = set.get("b", "a", RelationshipType::SemanticSimilarity).unwrap();
        assert_eq!(kept.source_id, "a");
        assert!((kept.strength - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_different_types_coexist() {
        let set: EdgeSet = vec![
            edge("a", "b", RelationshipType::SemanticSimilarity, 0.7),
            edge("a", "b", RelationshipType::SharedTopics, 0.2),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_attach_shared_entities_to_semantic_edge() {
        let mut set = EdgeSet::new();
        set.insert(edge("a", "b", RelationshipType::SemanticSimilarity, 0.7));

        let shared = vec!["paris".to_string()];
        assert!(set.attach_shared_entities("b", "a", &shared));
        assert!(!set.attach_shared_entities("a", "c", &shared));

        let kept = set.get("a", "b", RelationshipType::SemanticSimilarity).unwrap();
        assert_eq!(kept.metadata[SHARED_ENTITIES_KEY], json!(["paris"]));
        assert!((kept.strength - 0.7).abs() < 1e-6);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_into_vec_keeps_insertion_order() {
        let mut set = EdgeSet::new();
        set.insert(edge("c", "d", RelationshipType::SharedTopics, 0.2));
        set.insert(edge("a", "b", RelationshipType::SharedTopics, 0.3));
        let ids: Vec<String> = set.into_vec().into_iter().map(|e| e.source_id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }
}
