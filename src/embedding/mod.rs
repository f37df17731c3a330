//! Text embedding (C1).
//!
//! The embedder is a pure function from text to a fixed-dimensional,
//! L2-normalized vector. It carries no persistent state; everything
//! downstream (drift thresholds, paraphrase tolerance) is defined in terms
//! of the unit-vector dot product this module provides.

mod hashing;

pub use hashing::HashEmbedder;

use crate::Result;

/// A fixed-dimensional, L2-normalized embedding.
pub type Vector = Vec<f32>;

/// Trait for embedding generators.
///
/// Implementations must be deterministic for a given `model_id`: the same
/// text always produces the same vector as long as the model identifier is
/// unchanged. Callers record `model_id()` alongside each memory so stale
/// vectors can be detected and re-embedded after a model change.
pub trait Embedder: Send + Sync {
    /// Returns the embedding dimensionality.
    fn dimensions(&self) -> usize;

    /// Identifies the embedding model. Stored with each memory.
    fn model_id(&self) -> &str;

    /// Embeds a single piece of text into a unit-norm vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be embedded (e.g. empty text
    /// rejected by a stricter implementation).
    fn embed(&self, text: &str) -> Result<Vector>;

    /// Embeds a batch of texts. The default implementation embeds each
    /// text independently; batching implementations may override this for
    /// throughput.
    ///
    /// # Errors
    ///
    /// Returns an error if any text fails to embed.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Computes the drift between two unit vectors: `1 - dot(a, b)`.
///
/// Vectors of mismatched length, or either vector being empty, are treated
/// as maximum drift (`1.0`) per the detector's failure semantics — a
/// missing vector must never be read as "no drift".
#[must_use]
pub fn drift(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (1.0 - dot).clamp(0.0, 2.0)
}

/// L2-normalizes a vector in place. A zero vector is left unchanged.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_of_identical_unit_vectors_is_zero() {
        let v = vec![1.0_f32, 0.0, 0.0];
        assert!(drift(&v, &v) < 1e-6);
    }

    #[test]
    fn drift_of_orthogonal_unit_vectors_is_one() {
        let a = vec![1.0_f32, 0.0];
        let b = vec![0.0_f32, 1.0];
        assert!((drift(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn missing_vector_is_maximum_drift() {
        assert!((drift(&[], &[1.0]) - 1.0).abs() < 1e-6);
        assert!((drift(&[1.0, 0.0], &[1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_produces_unit_vector() {
        let mut v = vec![3.0_f32, 4.0];
        normalize(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }
}
