//! Analysis runs over the whole note store.
//!
//! A run lists every note, infers relationships, writes each edge back through
//! the store's pair-reconciling upsert, and indexes the embeddings computed on
//! the way so semantic search sees the same vectors the graph was built from.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use notescape_core::{Error, Metadata, Result};
use notescape_db::Database;
use notescape_graph::{AnalysisOutcome, AnalysisReport, RelationshipExtractor};

/// Persisted analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct PersistedRun {
    #[serde(flatten)]
    pub report: AnalysisReport,
    /// Distinct stored relationships written by this run.
    pub stored_relationships: usize,
    /// Vectors written to the index.
    pub indexed_vectors: usize,
    /// Edges dropped because an endpoint was deleted during the run.
    pub dropped_edges: usize,
}

/// Result of [`AnalysisService::run`].
#[derive(Debug, Clone)]
pub enum AnalysisRun {
    NothingToAnalyze,
    Analyzed(PersistedRun),
}

/// Service wiring the extractor to the stores.
pub struct AnalysisService {
    db: Database,
    extractor: Arc<RelationshipExtractor>,
}

impl AnalysisService {
    pub fn new(db: Database, extractor: Arc<RelationshipExtractor>) -> Self {
        Self { db, extractor }
    }

    #[instrument(skip(self), fields(subsystem = "api", component = "analysis_service", op = "run"))]
    pub async fn run(&self) -> Result<AnalysisRun> {
        let notes = self.db.notes.list_all().await?;

        let report = match self.extractor.analyze(&notes).await? {
            AnalysisOutcome::NothingToAnalyze => return Ok(AnalysisRun::NothingToAnalyze),
            AnalysisOutcome::Analyzed(report) => report,
        };

        let mut stored = HashSet::with_capacity(report.edges.len());
        let mut vanished = HashSet::new();
        let mut dropped_edges = 0;
        for edge in &report.edges {
            match self.db.notes.upsert_relationship(edge.clone()).await {
                Ok(id) => {
                    stored.insert(id);
                }
                Err(Error::NoteNotFound(note_id)) => {
                    warn!(
                        note_id = %note_id,
                        source = %edge.source_id,
                        target = %edge.target_id,
                        "Note deleted during analysis, dropping edge"
                    );
                    vanished.insert(note_id);
                    dropped_edges += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let titles: HashMap<&str, &str> = notes
            .iter()
            .map(|n| (n.id.as_str(), n.title.as_str()))
            .collect();
        let mut indexed_vectors = 0;
        for (id, vector) in &report.embeddings {
            if vanished.contains(id) {
                continue;
            }
            let mut metadata = Metadata::new();
            if let Some(title) = titles.get(id.as_str()) {
                metadata.insert("title".to_string(), json!(title));
            }
            self.db.vectors.upsert(id, vector.clone(), metadata).await?;
            indexed_vectors += 1;
        }

        info!(
            edges = report.edge_count(),
            stored_relationships = stored.len(),
            indexed_vectors,
            dropped_edges,
            "Analysis results persisted"
        );

        Ok(AnalysisRun::Analyzed(PersistedRun {
            report,
            stored_relationships: stored.len(),
            indexed_vectors,
            dropped_edges,
        }))
    }
}
