//! Deterministic hashing embedder.
//!
//! Stands in for a real sentence-transformer model (fastembed-style) in
//! environments where no such model is available. It hashes each token
//! into a fixed-width bucket vector, weights by term frequency, and
//! L2-normalizes the result. Because the hash is a fixed, seedless
//! `DefaultHasher`, the output is reproducible across processes for a
//! given `dimensions`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::{Embedder, Vector, normalize};
use crate::{Error, Result};

/// Default embedding width, matching common sentence-transformer output
/// dimensionality.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Hashing-based fallback embedder.
pub struct HashEmbedder {
    dimensions: usize,
    model_id: String,
}

impl HashEmbedder {
    /// Creates an embedder with the default dimensionality.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_DIMENSIONS)
    }

    /// Creates an embedder with a custom dimensionality.
    #[must_use]
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            model_id: format!("hashing-v1-{dimensions}"),
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimensions
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return Err(Error::InvalidInput(
                "text contains no alphanumeric tokens".to_string(),
            ));
        }
        let mut v = vec![0.0_f32; self.dimensions];
        for token in &tokens {
            let idx = self.bucket(token);
            v[idx] += 1.0;
        }
        normalize(&mut v);
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_unit_norm() {
        let e = HashEmbedder::new();
        let v = e.embed("the quick brown fox").expect("embed");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn deterministic_for_same_text() {
        let e = HashEmbedder::new();
        let v1 = e.embed("my favorite color is blue").expect("embed");
        let v2 = e.embed("my favorite color is blue").expect("embed");
        assert_eq!(v1, v2);
    }

    #[test]
    fn rejects_empty_text() {
        let e = HashEmbedder::new();
        assert!(e.embed("").is_err());
        assert!(e.embed("   ").is_err());
    }

    #[test]
    fn similar_sentences_drift_less_than_unrelated_ones() {
        use super::super::drift;
        let e = HashEmbedder::new();
        let a = e.embed("my favorite color is blue").expect("embed");
        let b = e.embed("my favorite color is green now").expect("embed");
        let c = e.embed("the quarterly earnings report exceeded forecasts").expect("embed");
        assert!(drift(&a, &b) < drift(&a, &c));
    }
}
