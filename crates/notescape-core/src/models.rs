//! Data models for notes, entities, relationships and graph payloads.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Open, order-irrelevant string-keyed metadata map.
pub type Metadata = serde_json::Map<String, JsonValue>;

/// Embedding vector.
pub type Vector = Vec<f32>;

/// Metadata key holding the lower-cased entity spans two notes share.
pub const SHARED_ENTITIES_KEY: &str = "shared_entities";

/// Metadata key holding the keywords two notes share.
pub const SHARED_KEYWORDS_KEY: &str = "shared_keywords";

// =============================================================================
// NOTES
// =============================================================================

/// A unit of text content with identity, title, tags and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Note {
    /// Create a note stamped with the current time.
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            source: None,
            created_at: now,
            updated_at: now,
            metadata: Metadata::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Request for creating a new note. Missing fields get defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewNote {
    /// Resolve defaults: UUIDv7 id, current timestamps.
    pub fn into_note(self) -> Note {
        let now = Utc::now();
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => uuid::Uuid::now_v7().to_string(),
        };
        let created_at = self.created_at.unwrap_or(now);
        Note {
            id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            source: self.source,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
            metadata: self.metadata,
        }
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A named span of text with a semantic category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(rename = "type")]
    pub label: String,
    /// Character offset of the first character.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            start,
            end,
        }
    }

    /// Identity used when comparing entities across notes.
    pub fn normalized(&self) -> String {
        self.text.trim().to_lowercase()
    }
}

// =============================================================================
// RELATIONSHIPS
// =============================================================================

/// Inferred relationship category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Embedding cosine similarity above threshold.
    SemanticSimilarity,
    /// One or more named entities in common.
    SharedEntities,
    /// Two or more top keywords in common.
    SharedTopics,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SemanticSimilarity => "semantic_similarity",
            Self::SharedEntities => "shared_entities",
            Self::SharedTopics => "shared_topics",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "semantic_similarity" => Ok(Self::SemanticSimilarity),
            "shared_entities" => Ok(Self::SharedEntities),
            "shared_topics" | "keyword_overlap" => Ok(Self::SharedTopics),
            _ => Err(format!("Invalid relationship type: {}", s)),
        }
    }
}

/// Clamp a raw score into `[0, 1]`. NaN becomes 0.
pub fn clamp_strength(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Identity of an unordered note pair: `(a, b)` and `(b, a)` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (low, high) = match a.cmp(b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        Self {
            low: low.to_string(),
            high: high.to_string(),
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }
}

/// A typed, weighted, logically unordered connection between two notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
    pub strength: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Relationship {
    /// Build an edge. Rejects self edges and clamps strength into `[0, 1]`.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
        strength: f32,
    ) -> Result<Self> {
        let source_id = source_id.into();
        let target_id = target_id.into();
        if source_id == target_id {
            return Err(Error::InvalidInput(format!(
                "relationship endpoints must differ: {}",
                source_id
            )));
        }
        Ok(Self {
            source_id,
            target_id,
            relationship_type,
            strength: clamp_strength(strength),
            metadata: Metadata::new(),
        })
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.source_id, &self.target_id)
    }

    /// True if this edge joins `a` and `b` in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source_id == a && self.target_id == b) || (self.source_id == b && self.target_id == a)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source_id == id || self.target_id == id
    }

    /// Entity spans recorded on this edge, if any.
    pub fn shared_entities(&self) -> Vec<String> {
        string_list(self.metadata.get(SHARED_ENTITIES_KEY))
    }

    /// Keywords recorded on this edge, if any.
    pub fn shared_keywords(&self) -> Vec<String> {
        string_list(self.metadata.get(SHARED_KEYWORDS_KEY))
    }
}

impl Relationship {
    /// Fold another edge for the same pair and type into this one.
    ///
    /// Keeps the higher strength. String lists in metadata are unioned in
    /// first-seen order; other keys already present are left untouched.
    pub fn absorb(&mut self, other: Relationship) {
        if other.strength > self.strength {
            self.strength = other.strength;
        }
        merge_metadata(&mut self.metadata, other.metadata);
    }
}

/// Merge `incoming` into `target` as described on [`Relationship::absorb`].
pub fn merge_metadata(target: &mut Metadata, incoming: Metadata) {
    for (key, value) in incoming {
        match target.get_mut(&key) {
            Some(JsonValue::Array(existing)) => {
                if let JsonValue::Array(items) = value {
                    for item in items {
                        if !existing.contains(&item) {
                            existing.push(item);
                        }
                    }
                }
            }
            Some(_) => {}
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn string_list(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// GRAPH PAYLOAD
// =============================================================================

/// Visualization node, one per note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Visualization link, one per related unordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    pub value: f32,
}

/// Node/link payload consumed by graph front-ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

// =============================================================================
// VECTOR STORE
// =============================================================================

/// A hit returned by a vector store similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}
