//! Service layer for notescape-api.

pub mod analysis;
pub mod search;

pub use analysis::{AnalysisRun, AnalysisService, PersistedRun};
pub use search::{SearchHit, SearchMode, SearchResults, SearchService};
