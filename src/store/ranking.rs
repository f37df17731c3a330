//! Retrieval ranking (§4.3).
//!
//! ```text
//! score = w_sim   * sim(q, m.vector)
//!       + w_trust * m.trust
//!       + w_conf  * m.confidence
//!       + w_recency * recency_decay(now - m.updated_at)
//!       - w_deprecated * is_deprecated(m)
//! ```
//!
//! Weights are configuration, never learned online. Ties are broken by
//! higher `updated_at`, then lexicographically larger `id`, purely so
//! retrieval is deterministic under test.

use std::cmp::Ordering;

use crate::config::Weights;

use super::Memory;

/// A candidate paired with its final ranking score, ordered so that
/// sorting descending yields the spec's tie-break rule.
#[derive(Debug, Clone)]
pub struct RankedMemory {
    /// The candidate memory.
    pub memory: Memory,
    /// Its composite ranking score.
    pub score: f32,
}

impl PartialEq for RankedMemory {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key() == other.cmp_key()
    }
}
impl Eq for RankedMemory {}

impl RankedMemory {
    fn cmp_key(&self) -> (ordered_f32::OrderedF32, u64, &str) {
        (
            ordered_f32::OrderedF32(self.score),
            self.memory.updated_at,
            self.memory.id.as_str(),
        )
    }
}

impl PartialOrd for RankedMemory {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedMemory {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher score first; ties broken by higher updated_at, then by
        // lexicographically larger id. All three comparisons are
        // "greater is better", so we compare self-to-other directly and
        // the caller sorts descending.
        self.cmp_key().cmp(&other.cmp_key())
    }
}

/// A tiny total-order wrapper over `f32` for scores, which are never NaN
/// in this module (all inputs are clamped to `[0, 1]` ranges or derived
/// from them).
mod ordered_f32 {
    use std::cmp::Ordering;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct OrderedF32(pub f32);

    impl Eq for OrderedF32 {}

    impl PartialOrd for OrderedF32 {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for OrderedF32 {
        fn cmp(&self, other: &Self) -> Ordering {
            self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
        }
    }
}

/// Exponential recency decay: `0.5 ^ (elapsed_secs / half_life)`.
#[must_use]
pub fn recency_decay(elapsed_secs: f64, half_life_secs: f64) -> f32 {
    if half_life_secs <= 0.0 {
        return 0.0;
    }
    let ratio = elapsed_secs.max(0.0) / half_life_secs;
    0.5_f64.powf(ratio) as f32
}

/// Computes the composite ranking score for a single candidate.
#[must_use]
pub fn score(
    sim: f32,
    trust: f32,
    confidence: f32,
    elapsed_secs: f64,
    is_deprecated: bool,
    weights: &Weights,
) -> f32 {
    let recency = recency_decay(elapsed_secs, weights.recency_half_life_secs);
    let deprecated_penalty = if is_deprecated { weights.deprecated } else { 0.0 };
    weights.sim * sim + weights.trust * trust + weights.conf * confidence
        + weights.recency * recency
        - deprecated_penalty
}
