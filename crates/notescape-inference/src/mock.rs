//! Mock inference backends for deterministic testing.
//!
//! Enabled with the `mock` feature so downstream crates can drive the
//! relationship pipeline without a model server.
//!
//! ## Usage
//!
//! ```rust
//! use notescape_core::EmbeddingBackend;
//! use notescape_inference::mock::MockEmbeddingBackend;
//!
//! # tokio_test_block(async {
//! let backend = MockEmbeddingBackend::new()
//!     .with_dimension(3)
//!     .with_vector("hello", vec![1.0, 0.0, 0.0]);
//!
//! let vectors = backend.embed_texts(&["hello".to_string()]).await.unwrap();
//! assert_eq!(vectors[0], vec![1.0, 0.0, 0.0]);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use notescape_core::{Entity, EmbeddingBackend, EntityExtractor, Error, Result, Stage, Vector};

/// How a mock backend fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// `Error::ProviderUnavailable`
    Unavailable,
    /// `Error::Provider`
    Transient,
}

impl MockFailure {
    fn to_error(self, stage: Stage, input: &str) -> Error {
        match self {
            MockFailure::Unavailable => {
                Error::ProviderUnavailable(format!("mock {} backend offline", stage))
            }
            MockFailure::Transient => {
                Error::provider(stage, format!("mock failure for input {:?}", input))
            }
        }
    }
}

/// A recorded call against a mock backend.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub inputs: Vec<String>,
}

type CallLog = Arc<Mutex<Vec<MockCall>>>;

fn record(log: &CallLog, operation: &str, inputs: Vec<String>) {
    let mut calls = log.lock().unwrap_or_else(|e| e.into_inner());
    calls.push(MockCall {
        operation: operation.to_string(),
        inputs,
    });
}

fn snapshot(log: &CallLog) -> Vec<MockCall> {
    log.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

// =============================================================================
// EMBEDDINGS
// =============================================================================

#[derive(Debug, Clone)]
struct EmbeddingConfig {
    dimension: usize,
    model: String,
    fixed: HashMap<String, Vector>,
    failing_texts: HashSet<String>,
    failure: Option<MockFailure>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            model: "mock-embed".to_string(),
            fixed: HashMap::new(),
            failing_texts: HashSet::new(),
            failure: None,
        }
    }
}

/// Mock embedding backend.
///
/// Texts registered with [`with_vector`](Self::with_vector) get that vector;
/// every other text gets a deterministic vector from [`MockEmbeddingGenerator`].
#[derive(Clone, Default)]
pub struct MockEmbeddingBackend {
    config: Arc<EmbeddingConfig>,
    call_log: CallLog,
}

impl MockEmbeddingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the embedding dimension for generated vectors.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Set the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model = model.into();
        self
    }

    /// Return `vector` whenever `text` is embedded.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vector) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed
            .insert(text.into(), vector);
        self
    }

    /// Fail the whole batch with a transient error if it contains `text`.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config)
            .failing_texts
            .insert(text.into());
        self
    }

    /// Fail every call.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        snapshot(&self.call_log)
    }

    /// Number of `embed_texts` calls.
    pub fn embed_call_count(&self) -> usize {
        self.get_calls().len()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        record(&self.call_log, "embed", texts.to_vec());

        if let Some(failure) = self.config.failure {
            return Err(failure.to_error(Stage::Embedding, ""));
        }
        if let Some(bad) = texts.iter().find(|t| self.config.failing_texts.contains(*t)) {
            return Err(MockFailure::Transient.to_error(Stage::Embedding, bad));
        }

        Ok(texts
            .iter()
            .map(|t| {
                self.config
                    .fixed
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| MockEmbeddingGenerator::generate(t, self.config.dimension))
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

#[derive(Debug, Clone, Default)]
struct EntityConfig {
    fixed: HashMap<String, Vec<Entity>>,
    failing_texts: HashSet<String>,
    failure: Option<MockFailure>,
}

/// Mock entity extractor. Unregistered texts have no entities.
#[derive(Clone, Default)]
pub struct MockEntityExtractor {
    config: Arc<EntityConfig>,
    call_log: CallLog,
}

impl MockEntityExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `entities` whenever `text` is analyzed.
    pub fn with_entities(mut self, text: impl Into<String>, entities: Vec<Entity>) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed
            .insert(text.into(), entities);
        self
    }

    /// Convenience: register entity spans by text alone, labelled `MISC`.
    pub fn with_spans(self, text: impl Into<String>, spans: &[&str]) -> Self {
        let text = text.into();
        let entities = spans
            .iter()
            .map(|s| {
                let start = text.find(s).map(|b| text[..b].chars().count()).unwrap_or(0);
                Entity::new(*s, "MISC", start, start + s.chars().count())
            })
            .collect();
        self.with_entities(text, entities)
    }

    /// Fail with a transient error when `text` is analyzed.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config)
            .failing_texts
            .insert(text.into());
        self
    }

    /// Fail every call.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        snapshot(&self.call_log)
    }
}

#[async_trait]
impl EntityExtractor for MockEntityExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<Entity>> {
        record(&self.call_log, "extract", vec![text.to_string()]);

        if let Some(failure) = self.config.failure {
            return Err(failure.to_error(Stage::EntityExtraction, text));
        }
        if self.config.failing_texts.contains(text) {
            return Err(MockFailure::Transient.to_error(Stage::EntityExtraction, text));
        }
        Ok(self.config.fixed.get(text).cloned().unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        "mock-ner"
    }
}

// =============================================================================
// GENERATORS
// =============================================================================

/// Deterministic embedding generator.
pub struct MockEmbeddingGenerator;

impl MockEmbeddingGenerator {
    /// Generate a deterministic embedding from text.
    ///
    /// Uses character-based hashing for reproducibility. The same text
    /// will always produce the same embedding.
    pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
        if dimension == 0 {
            return Vec::new();
        }
        let mut vec = vec![0.0; dimension];

        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % dimension;
            vec[idx] += 0.1;
        }

        Self::normalize(&mut vec);
        vec
    }

    /// Unit vector along `axis`. Orthogonal axes have similarity 0.
    pub fn axis(axis: usize, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension];
        if axis < dimension {
            vec[axis] = 1.0;
        }
        vec
    }

    /// Unit vector in the plane of axes 0 and 1 whose cosine with axis 0 is `similarity`.
    pub fn at_similarity(similarity: f32, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension.max(2)];
        let s = similarity.clamp(-1.0, 1.0);
        vec[0] = s;
        vec[1] = (1.0 - s * s).max(0.0).sqrt();
        vec
    }

    fn normalize(vec: &mut [f32]) {
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vec.iter_mut() {
                *x /= norm;
            }
        }
    }
}
