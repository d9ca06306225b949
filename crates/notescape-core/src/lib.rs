//! # notescape-core
//!
//! Core types, traits, and abstractions for notescape.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other notescape crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod similarity;
pub mod stopwords;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result, Stage};
pub use models::*;
pub use similarity::{cosine_similarity, pairwise_similarity, SimilarityMatrix};
pub use stopwords::is_stop_word;
pub use traits::*;
