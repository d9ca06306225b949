//! # notescape-graph
//!
//! Relationship inference and graph assembly for notescape.
//!
//! This crate provides:
//! - Stop-word/frequency keyword extraction
//! - Unordered-pair edge deduplication and merging
//! - The relationship extractor (semantic, keyword and composite strategies)
//! - Node/link graph assembly for visualization
//!
//! ## Example
//!
//! ```ignore
//! use notescape_graph::{ExtractorConfig, RelationshipExtractor};
//!
//! let extractor = RelationshipExtractor::new(ExtractorConfig::default())?
//!     .with_embeddings(embedder)
//!     .with_entity_extractor(ner);
//!
//! match extractor.analyze(&notes).await? {
//!     AnalysisOutcome::NothingToAnalyze => println!("no notes"),
//!     AnalysisOutcome::Analyzed(report) => println!("{} edges", report.edges.len()),
//! }
//! ```

pub mod assembler;
pub mod edges;
pub mod extractor;
pub mod keywords;

pub use assembler::GraphAssembler;
pub use edges::EdgeSet;
pub use extractor::{
    AnalysisOutcome, AnalysisReport, DegradedNote, ExtractorConfig, RelationshipExtractor,
    SkippedNote, Strategy,
};
pub use keywords::KeywordExtractor;
