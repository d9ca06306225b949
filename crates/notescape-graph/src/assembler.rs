//! Visualization graph assembly.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use notescape_core::{
    GraphData, GraphLink, GraphNode, Note, NoteStore, PairKey, Relationship, Result,
};

/// Builds the node/link payload for graph front-ends.
///
/// One node per note. One link per related unordered pair, however many
/// edge types the pair has; the strongest edge wins and the link always runs
/// from the lexicographically smaller id to the larger one.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphAssembler;

impl GraphAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble from notes and a per-note relationship lookup.
    ///
    /// Edges whose other endpoint is not among `notes` are dropped.
    pub fn assemble<F>(&self, notes: &[Note], mut relationships_for: F) -> GraphData
    where
        F: FnMut(&str) -> Vec<Relationship>,
    {
        let known: HashSet<&str> = notes.iter().map(|n| n.id.as_str()).collect();

        let nodes = notes
            .iter()
            .map(|note| GraphNode {
                id: note.id.clone(),
                label: note.title.clone(),
                content: note.content.clone(),
                tags: note.tags.clone(),
            })
            .collect();

        let mut order: Vec<PairKey> = Vec::new();
        let mut best: HashMap<PairKey, Relationship> = HashMap::new();

        for note in notes {
            for edge in relationships_for(&note.id) {
                if edge.source_id == edge.target_id
                    || !known.contains(edge.source_id.as_str())
                    || !known.contains(edge.target_id.as_str())
                {
                    continue;
                }
                let key = edge.pair_key();
                match best.get_mut(&key) {
                    Some(current) => {
                        if edge.strength > current.strength {
                            *current = edge;
                        }
                    }
                    None => {
                        order.push(key.clone());
                        best.insert(key, edge);
                    }
                }
            }
        }

        let links = order
            .into_iter()
            .filter_map(|key| {
                best.remove(&key).map(|edge| GraphLink {
                    source: key.low().to_string(),
                    target: key.high().to_string(),
                    kind: edge.relationship_type,
                    value: edge.strength,
                })
            })
            .collect();

        GraphData { nodes, links }
    }

    /// Assemble the full graph held by a note store.
    #[instrument(skip(self, store), fields(subsystem = "graph", component = "assembler", op = "assemble"))]
    pub async fn assemble_from_store(&self, store: &dyn NoteStore) -> Result<GraphData> {
        let notes = store.list_all().await?;

        let mut by_note: HashMap<String, Vec<Relationship>> = HashMap::new();
        for note in &notes {
            by_note.insert(note.id.clone(), store.relationships_for(&note.id).await?);
        }

        let graph = self.assemble(&notes, |id| by_note.remove(id).unwrap_or_default());
        debug!(
            node_count = graph.nodes.len(),
            link_count = graph.links.len(),
            "Graph assembled"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notescape_core::RelationshipType;

    fn notes() -> Vec<Note> {
        vec![
            Note::new("b", "Beta", "second").with_tags(["x"]),
            Note::new("a", "Alpha", "first"),
            Note::new("c", "Gamma", "third"),
        ]
    }

    fn edge(a: &str, b: &str, kind: RelationshipType, strength: f32) -> Relationship {
        Relationship::new(a, b, kind, strength).unwrap()
    }

    #[test]
    fn test_every_note_becomes_a_node() {
        let graph = GraphAssembler::new().assemble(&notes(), |_| Vec::new());
        assert_eq!(graph.nodes.len(), 3);
        assert!(graph.links.is_empty());
        assert_eq!(graph.nodes[0].label, "Beta");
        assert_eq!(graph.nodes[0].tags, vec!["x"]);
    }

    #[test]
    fn test_mirrored_lookups_yield_one_link() {
        let edges = vec![edge("b", "a", RelationshipType::SharedTopics, 0.3)];
        let graph = GraphAssembler::new().assemble(&notes(), |id| {
            edges.iter().filter(|e| e.touches(id)).cloned().collect()
        });

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].source, "a");
        assert_eq!(graph.links[0].target, "b");
    }

    #[test]
    fn test_multiple_types_collapse_to_strongest() {
        let edges = vec![
            edge("a", "b", RelationshipType::SharedTopics, 0.3),
            edge("a", "b", RelationshipType::SemanticSimilarity, 0.8),
        ];
        let graph = GraphAssembler::new().assemble(&notes(), |id| {
            edges.iter().filter(|e| e.touches(id)).cloned().collect()
        });

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].kind, RelationshipType::SemanticSimilarity);
        assert!((graph.links[0].value - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_dangling_edges_dropped() {
        let edges = vec![edge("a", "zzz", RelationshipType::SharedTopics, 0.3)];
        let graph = GraphAssembler::new().assemble(&notes(), |id| {
            edges.iter().filter(|e| e.touches(id)).cloned().collect()
        });
        assert!(graph.links.is_empty());
        assert_eq!(graph.nodes.len(), 3);
    }

    #[test]
    fn test_links_always_low_to_high() {
        let edges = vec![
            edge("c", "a", RelationshipType::SharedEntities, 0.4),
            edge("c", "b", RelationshipType::SharedEntities, 0.2),
        ];
        let graph = GraphAssembler::new().assemble(&notes(), |id| {
            edges.iter().filter(|e| e.touches(id)).cloned().collect()
        });
        assert_eq!(graph.links.len(), 2);
        assert!(graph.links.iter().all(|l| l.source < l.target));
    }
}
