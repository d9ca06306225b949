//! Relationship extraction over a batch of notes.
//!
//! Three strategies:
//! - **Semantic**: embedding similarity edges above a threshold, plus entity
//!   overlap. Entity overlap for a pair that already has a semantic edge is
//!   recorded on that edge; otherwise it becomes a `shared_entities` edge.
//! - **Keyword**: `shared_topics` edges from top-keyword overlap. Used when no
//!   embedding backend is configured.
//! - **Composite**: both of the above. Edges of different types for the same
//!   pair coexist.
//!
//! Every run examines all `N * (N - 1) / 2` unordered pairs and holds no state
//! between runs.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, trace, warn};

use notescape_core::{
    defaults, EmbeddingBackend, EntityExtractor, Error, Note, Relationship, RelationshipType,
    Result, Stage, Vector, SHARED_ENTITIES_KEY, SHARED_KEYWORDS_KEY,
};

use crate::edges::EdgeSet;
use crate::keywords::KeywordExtractor;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Thresholds and limits for relationship extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Minimum cosine similarity for a semantic edge.
    pub similarity_threshold: f32,
    /// Shared entity count at which strength reaches 1.0.
    pub entity_saturation: usize,
    /// Keywords kept per note.
    pub keyword_top_n: usize,
    /// Minimum shared keywords for a topic edge.
    pub min_shared_keywords: usize,
    /// Shared keyword count divisor for topic edge strength.
    pub keyword_strength_divisor: f32,
    /// Upper bound on topic edge strength.
    pub keyword_strength_cap: f32,
    /// Concurrent entity extraction calls.
    pub entity_concurrency: usize,
    /// Largest batch accepted by one run.
    pub max_batch_size: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::SIMILARITY_THRESHOLD,
            entity_saturation: defaults::ENTITY_SATURATION,
            keyword_top_n: defaults::KEYWORD_TOP_N,
            min_shared_keywords: defaults::MIN_SHARED_KEYWORDS,
            keyword_strength_divisor: defaults::KEYWORD_STRENGTH_DIVISOR,
            keyword_strength_cap: defaults::KEYWORD_STRENGTH_CAP,
            entity_concurrency: defaults::ENTITY_CONCURRENCY,
            max_batch_size: defaults::MAX_BATCH_SIZE,
        }
    }
}

impl ExtractorConfig {
    /// Create a config with a custom similarity threshold.
    pub fn with_threshold(similarity_threshold: f32) -> Self {
        Self {
            similarity_threshold,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.entity_saturation == 0 {
            return Err(Error::Config("entity_saturation must be at least 1".to_string()));
        }
        if self.min_shared_keywords == 0 {
            return Err(Error::Config(
                "min_shared_keywords must be at least 1".to_string(),
            ));
        }
        if self.keyword_strength_divisor.is_nan() || self.keyword_strength_divisor <= 0.0 {
            return Err(Error::Config(
                "keyword_strength_divisor must be positive".to_string(),
            ));
        }
        if self.keyword_strength_cap.is_nan()
            || self.keyword_strength_cap <= 0.0
            || self.keyword_strength_cap > 1.0
        {
            return Err(Error::Config(format!(
                "keyword_strength_cap must be within (0, 1], got {}",
                self.keyword_strength_cap
            )));
        }
        if self.entity_concurrency == 0 || self.max_batch_size == 0 {
            return Err(Error::Config(
                "entity_concurrency and max_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `min(1, shared / entity_saturation)`
    pub fn entity_strength(&self, shared: usize) -> f32 {
        (shared as f32 / self.entity_saturation as f32).min(1.0)
    }

    /// `min(keyword_strength_cap, shared / keyword_strength_divisor)`
    pub fn keyword_strength(&self, shared: usize) -> f32 {
        (shared as f32 / self.keyword_strength_divisor).min(self.keyword_strength_cap)
    }
}

/// Which signals an analysis run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Embedding similarity plus entity overlap.
    Semantic,
    /// Keyword overlap only.
    Keyword,
    /// Semantic and keyword together.
    Composite,
}

impl Strategy {
    fn uses_embeddings(self) -> bool {
        matches!(self, Strategy::Semantic | Strategy::Composite)
    }

    fn uses_keywords(self) -> bool {
        matches!(self, Strategy::Keyword | Strategy::Composite)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Keyword => write!(f, "keyword"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "keyword" | "keywords" => Ok(Self::Keyword),
            "composite" | "both" => Ok(Self::Composite),
            _ => Err(Error::Config(format!("Invalid analysis strategy: {}", s))),
        }
    }
}

// =============================================================================
// RUN REPORT
// =============================================================================

/// A note left out of the run because it was malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedNote {
    pub note_id: String,
    pub reason: String,
}

/// A note whose signal was replaced by an empty set after a provider failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedNote {
    pub note_id: String,
    pub stage: String,
    pub error: String,
}

/// Result of one analysis run over a non-empty batch.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub edges: Vec<Relationship>,
    pub notes_analyzed: usize,
    pub pairs_examined: usize,
    pub skipped: Vec<SkippedNote>,
    pub degraded: Vec<DegradedNote>,
    pub strategy: Strategy,
    /// Embedding model used, if any.
    pub provider: Option<String>,
    pub duration_ms: u64,
    /// Per-note vectors computed during the run, for downstream indexing.
    #[serde(skip)]
    pub embeddings: Vec<(String, Vector)>,
}

impl AnalysisReport {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges of one type.
    pub fn edges_of(&self, kind: RelationshipType) -> impl Iterator<Item = &Relationship> {
        self.edges.iter().filter(move |e| e.relationship_type == kind)
    }
}

/// Outcome of [`RelationshipExtractor::analyze`].
///
/// An empty batch is reported as [`NothingToAnalyze`](Self::NothingToAnalyze),
/// which is distinct from a run over many notes that found no edges.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    NothingToAnalyze,
    Analyzed(AnalysisReport),
}

impl AnalysisOutcome {
    pub fn is_nothing_to_analyze(&self) -> bool {
        matches!(self, Self::NothingToAnalyze)
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Analyzed(report) => Some(report),
            Self::NothingToAnalyze => None,
        }
    }

    /// The edge list, or `Error::EmptyBatch` for an empty batch.
    pub fn into_edges(self) -> Result<Vec<Relationship>> {
        match self {
            Self::Analyzed(report) => Ok(report.edges),
            Self::NothingToAnalyze => Err(Error::EmptyBatch),
        }
    }
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Infers typed, weighted relationships between notes.
///
/// Providers are injected at construction time; the extractor never reads
/// process configuration itself.
#[derive(Clone)]
pub struct RelationshipExtractor {
    config: ExtractorConfig,
    embedder: Option<Arc<dyn EmbeddingBackend>>,
    entity_extractor: Option<Arc<dyn EntityExtractor>>,
    keywords: KeywordExtractor,
    strategy: Option<Strategy>,
}

impl fmt::Debug for RelationshipExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipExtractor")
            .field("config", &self.config)
            .field("embedder", &self.embedder.as_ref().map(|e| e.model_name().to_string()))
            .field(
                "entity_extractor",
                &self.entity_extractor.as_ref().map(|e| e.model_name().to_string()),
            )
            .field("strategy", &self.strategy())
            .finish()
    }
}

impl RelationshipExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            embedder: None,
            entity_extractor: None,
            keywords: KeywordExtractor::new(),
            strategy: None,
        })
    }

    pub fn with_embeddings(mut self, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_entity_extractor(mut self, extractor: Arc<dyn EntityExtractor>) -> Self {
        self.entity_extractor = Some(extractor);
        self
    }

    /// Force a strategy instead of deriving it from the configured providers.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Strategy a run will use: the forced one, else semantic when an
    /// embedding backend is present, else keyword.
    pub fn strategy(&self) -> Strategy {
        self.strategy.unwrap_or(if self.embedder.is_some() {
            Strategy::Semantic
        } else {
            Strategy::Keyword
        })
    }

    /// Run a full analysis over `notes`.
    ///
    /// Blank and duplicate ids are skipped and listed in the report. A failed
    /// embedding call fails the run; a failed entity extraction for one note
    /// only degrades that note.
    #[instrument(skip(self, notes), fields(subsystem = "graph", component = "relationship_extractor", op = "analyze", note_count = notes.len(), strategy = %self.strategy()))]
    pub async fn analyze(&self, notes: &[Note]) -> Result<AnalysisOutcome> {
        if notes.is_empty() {
            debug!("Empty batch, nothing to analyze");
            return Ok(AnalysisOutcome::NothingToAnalyze);
        }

        let start = Instant::now();
        let strategy = self.strategy();
        let (batch, skipped) = partition_valid(notes);

        for skip in &skipped {
            warn!(note_id = %skip.note_id, reason = %skip.reason, "Skipping malformed note");
        }

        if batch.len() > self.config.max_batch_size {
            return Err(Error::InvalidInput(format!(
                "batch of {} notes exceeds max_batch_size {}",
                batch.len(),
                self.config.max_batch_size
            )));
        }

        let n = batch.len();
        let pairs_examined = n * n.saturating_sub(1) / 2;
        let mut edges = EdgeSet::new();
        let mut degraded = Vec::new();
        let mut embeddings = Vec::new();
        let mut provider = None;

        if strategy.uses_embeddings() {
            let embedder = self.embedder.as_ref().ok_or_else(|| {
                Error::Config(format!("{} strategy requires an embedding backend", strategy))
            })?;
            provider = Some(embedder.model_name().to_string());

            let vectors = self.embed_batch(embedder.as_ref(), &batch).await?;
            self.similarity_edges(embedder.as_ref(), &batch, &vectors, &mut edges)?;

            let entity_sets = self.entity_sets(&batch, &mut degraded).await;
            self.entity_edges(&batch, &entity_sets, &mut edges)?;

            embeddings = batch
                .iter()
                .map(|note| note.id.clone())
                .zip(vectors)
                .collect();
        }

        if strategy.uses_keywords() {
            self.keyword_edges(&batch, &mut edges)?;
        }

        let report = AnalysisReport {
            edges: edges.into_vec(),
            notes_analyzed: n,
            pairs_examined,
            skipped,
            degraded,
            strategy,
            provider,
            duration_ms: start.elapsed().as_millis() as u64,
            embeddings,
        };

        if !report.degraded.is_empty() {
            warn!(
                degraded = report.degraded.len(),
                "Analysis completed with degraded notes"
            );
        }
        info!(
            edge_count = report.edges.len(),
            pair_count = report.pairs_examined,
            skipped = report.skipped.len(),
            duration_ms = report.duration_ms,
            "Analysis complete"
        );

        Ok(AnalysisOutcome::Analyzed(report))
    }

    async fn embed_batch(
        &self,
        embedder: &dyn EmbeddingBackend,
        batch: &[&Note],
    ) -> Result<Vec<Vector>> {
        let texts: Vec<String> = batch.iter().map(|note| note.content.clone()).collect();
        let vectors = embedder.embed_texts(&texts).await?;

        if vectors.len() != texts.len() {
            return Err(Error::provider(
                Stage::Embedding,
                format!(
                    "backend returned {} vectors for {} notes",
                    vectors.len(),
                    texts.len()
                ),
            ));
        }

        // Every vector must share one dimension, or cosine silently scores 0.
        let expected = match embedder.dimension() {
            0 => vectors.first().map(Vec::len).unwrap_or_default(),
            dimension => dimension,
        };
        if let Some((note, vector)) = batch
            .iter()
            .zip(&vectors)
            .find(|(_, vector)| vector.len() != expected)
        {
            return Err(Error::provider(
                Stage::Embedding,
                format!(
                    "backend returned a {}-dimensional vector, expected {}",
                    vector.len(),
                    expected
                ),
            )
            .for_note(note.id.as_str()));
        }
        Ok(vectors)
    }

    fn similarity_edges(
        &self,
        embedder: &dyn EmbeddingBackend,
        batch: &[&Note],
        vectors: &[Vector],
        edges: &mut EdgeSet,
    ) -> Result<()> {
        let matrix = embedder.pairwise_similarity(vectors);

        for i in 0..batch.len() {
            for j in (i + 1)..batch.len() {
                let score = matrix.get(i, j);
                trace!(source = %batch[i].id, target = %batch[j].id, score, "pair similarity");
                if score >= self.config.similarity_threshold {
                    edges.insert(Relationship::new(
                        batch[i].id.as_str(),
                        batch[j].id.as_str(),
                        RelationshipType::SemanticSimilarity,
                        score,
                    )?);
                }
            }
        }
        Ok(())
    }

    /// Lower-cased entity spans per note, unique and in first-seen order.
    async fn entity_sets(
        &self,
        batch: &[&Note],
        degraded: &mut Vec<DegradedNote>,
    ) -> Vec<Vec<String>> {
        let extractor: Arc<dyn EntityExtractor> = match &self.entity_extractor {
            Some(extractor) => extractor.clone(),
            None => return vec![Vec::new(); batch.len()],
        };

        // Each future owns its text and extractor handle so the run stays `Send`.
        let texts: Vec<String> = batch.iter().map(|note| note.content.clone()).collect();
        let results: Vec<Result<Vec<notescape_core::Entity>>> = stream::iter(texts)
            .map(move |text| {
                let extractor = extractor.clone();
                async move { extractor.extract(&text).await }
            })
            .buffered(self.config.entity_concurrency)
            .collect()
            .await;

        batch
            .iter()
            .zip(results)
            .map(|(note, result)| match result {
                Ok(entities) => {
                    let mut seen = HashSet::new();
                    entities
                        .iter()
                        .map(|e| e.normalized())
                        .filter(|span| !span.is_empty() && seen.insert(span.clone()))
                        .collect()
                }
                Err(e) => {
                    let e = e.for_note(note.id.as_str());
                    warn!(note_id = %note.id, stage = %Stage::EntityExtraction, error = %e, "Entity extraction failed, treating note as entity-free");
                    degraded.push(DegradedNote {
                        note_id: note.id.clone(),
                        stage: Stage::EntityExtraction.to_string(),
                        error: e.to_string(),
                    });
                    Vec::new()
                }
            })
            .collect()
    }

    fn entity_edges(
        &self,
        batch: &[&Note],
        entity_sets: &[Vec<String>],
        edges: &mut EdgeSet,
    ) -> Result<()> {
        for i in 0..batch.len() {
            for j in (i + 1)..batch.len() {
                let shared = ordered_intersection(&entity_sets[i], &entity_sets[j]);
                if shared.is_empty() {
                    continue;
                }
                trace!(source = %batch[i].id, target = %batch[j].id, shared = shared.len(), "shared entities");

                if edges.attach_shared_entities(&batch[i].id, &batch[j].id, &shared) {
                    continue;
                }
                let strength = self.config.entity_strength(shared.len());
                edges.insert(
                    Relationship::new(
                        batch[i].id.as_str(),
                        batch[j].id.as_str(),
                        RelationshipType::SharedEntities,
                        strength,
                    )?
                    .with_metadata(SHARED_ENTITIES_KEY, string_array(shared)),
                );
            }
        }
        Ok(())
    }

    fn keyword_edges(&self, batch: &[&Note], edges: &mut EdgeSet) -> Result<()> {
        let keyword_sets: Vec<Vec<String>> = batch
            .iter()
            .map(|note| self.keywords.extract(&note.content, self.config.keyword_top_n))
            .collect();

        for i in 0..batch.len() {
            for j in (i + 1)..batch.len() {
                let shared = ordered_intersection(&keyword_sets[i], &keyword_sets[j]);
                if shared.len() < self.config.min_shared_keywords {
                    continue;
                }
                trace!(source = %batch[i].id, target = %batch[j].id, shared = shared.len(), "shared keywords");
                let strength = self.config.keyword_strength(shared.len());
                edges.insert(
                    Relationship::new(
                        batch[i].id.as_str(),
                        batch[j].id.as_str(),
                        RelationshipType::SharedTopics,
                        strength,
                    )?
                    .with_metadata(SHARED_KEYWORDS_KEY, string_array(shared)),
                );
            }
        }
        Ok(())
    }
}

/// Split a batch into analyzable notes and skipped ones.
///
/// Blank ids are skipped, as is every repeat of an id after its first use.
fn partition_valid(notes: &[Note]) -> (Vec<&Note>, Vec<SkippedNote>) {
    let mut seen = HashSet::new();
    let mut valid = Vec::with_capacity(notes.len());
    let mut skipped = Vec::new();

    for note in notes {
        if note.id.trim().is_empty() {
            skipped.push(SkippedNote {
                note_id: note.id.clone(),
                reason: Error::InvalidInput("blank note id".to_string()).to_string(),
            });
        } else if !seen.insert(note.id.as_str()) {
            skipped.push(SkippedNote {
                note_id: note.id.clone(),
                reason: Error::InvalidInput("duplicate note id".to_string()).to_string(),
            });
        } else {
            valid.push(note);
        }
    }

    (valid, skipped)
}

/// Items of `a` that also appear in `b`, in `a`'s order.
fn ordered_intersection(a: &[String], b: &[String]) -> Vec<String> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let other: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.iter()
        .filter(|item| other.contains(item.as_str()))
        .cloned()
        .collect()
}

fn string_array(items: Vec<String>) -> JsonValue {
    JsonValue::Array(items.into_iter().map(JsonValue::String).collect())
}
