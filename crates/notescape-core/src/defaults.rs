//! Centralized default constants for notescape.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// RELATIONSHIP INFERENCE
// =============================================================================

/// Minimum cosine similarity for a `semantic_similarity` edge.
pub const SIMILARITY_THRESHOLD: f32 = 0.6;

/// Shared-entity count at which `shared_entities` strength saturates at 1.0.
pub const ENTITY_SATURATION: usize = 5;

/// Keywords extracted per note for topic overlap.
pub const KEYWORD_TOP_N: usize = 15;

/// Minimum shared keywords for a `shared_topics` edge.
pub const MIN_SHARED_KEYWORDS: usize = 2;

/// Shared-keyword count divisor for `shared_topics` strength.
pub const KEYWORD_STRENGTH_DIVISOR: f32 = 10.0;

/// Keyword overlap alone never reaches certainty.
pub const KEYWORD_STRENGTH_CAP: f32 = 0.9;

/// Minimum token length kept by the keyword extractor.
pub const KEYWORD_MIN_TOKEN_LEN: usize = 3;

/// Concurrent per-note entity extraction calls.
pub const ENTITY_CONCURRENCY: usize = 4;

/// Upper bound on notes per analysis run (pairwise cost is quadratic).
pub const MAX_BATCH_SIZE: usize = 2000;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default embedding vector dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

/// Default OpenAI-compatible API URL.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default remote embedding model.
pub const OPENAI_EMBED_MODEL: &str = "text-embedding-3-small";

/// Dimension of text-embedding-3-small.
pub const OPENAI_EMBED_DIMENSION: usize = 1536;

/// Texts per OpenAI embeddings request.
pub const OPENAI_EMBED_BATCH_SIZE: usize = 20;

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for NER requests in seconds.
pub const NER_TIMEOUT_SECS: u64 = 30;

/// Embedding calls slower than this are logged as slow.
pub const SLOW_EMBED_MS: u64 = 5000;

/// Environment variable for the GLiNER sidecar base URL.
pub const ENV_GLINER_BASE_URL: &str = "GLINER_BASE_URL";

/// Default GLiNER confidence threshold.
pub const GLINER_THRESHOLD: f32 = 0.5;

/// Entity labels requested from zero-shot NER backends.
pub const NER_ENTITY_TYPES: &[&str] = &[
    "person",
    "organization",
    "location",
    "event",
    "product",
    "work of art",
];

// =============================================================================
// API
// =============================================================================

/// Default HTTP server host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default number of semantic search results.
pub const SEARCH_LIMIT: usize = 10;

/// Upper bound on search results per request.
pub const SEARCH_LIMIT_MAX: usize = 100;
