//! Structured logging field names shared by every notescape crate.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, fallback or degradation applied |
//! | INFO  | Lifecycle events, analysis run completions |
//! | DEBUG | Decision points, provider selection, thresholds |
//! | TRACE | Per-pair and per-note data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "graph", "db", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "ollama", "openai", "gliner", "relationship_extractor"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "embed_texts", "extract", "analyze"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note id being operated on.
pub const NOTE_ID: &str = "note_id";

/// Pipeline stage (embedding, entity_extraction, ...).
pub const STAGE: &str = "stage";

/// Analysis strategy ("semantic", "keyword", "composite").
pub const STRATEGY: &str = "strategy";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of notes in an analysis batch.
pub const NOTE_COUNT: &str = "note_count";

/// Number of unordered pairs examined.
pub const PAIR_COUNT: &str = "pair_count";

/// Number of edges emitted.
pub const EDGE_COUNT: &str = "edge_count";

/// Number of input texts sent to an embedding model.
pub const INPUT_COUNT: &str = "input_count";

/// Number of results returned.
pub const RESULT_COUNT: &str = "result_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Provider selected by the resolution policy.
pub const PROVIDER: &str = "provider";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
