//! Cosine similarity and pairwise similarity matrices.

/// Cosine similarity between two vectors.
///
/// Mismatched lengths, empty vectors, zero-norm vectors and non-finite
/// results all yield `0.0`. Accumulates in `f64` so `cosine_similarity(a, a)`
/// stays within `1e-6` of `1.0` for large dimensions.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

/// Square, symmetric similarity matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity between item `i` and item `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(i < self.size && j < self.size, "index out of bounds");
        self.values[i * self.size + j]
    }
}

/// Full pairwise cosine similarity matrix.
///
/// Only the upper triangle is computed; the lower triangle mirrors it so the
/// result is exactly symmetric.
pub fn pairwise_similarity(vectors: &[Vec<f32>]) -> SimilarityMatrix {
    let size = vectors.len();
    let mut values = vec![0.0f32; size * size];

    for i in 0..size {
        values[i * size + i] = cosine_similarity(&vectors[i], &vectors[i]);
        for j in (i + 1)..size {
            let sim = cosine_similarity(&vectors[i], &vectors[j]);
            values[i * size + j] = sim;
            values[j * size + i] = sim;
        }
    }

    SimilarityMatrix { size, values }
}
