//! Grounding gate (§4.6 step 3): for non-factual output, is the content
//! anchored to something actually retrieved?

use crate::embedding::drift;
use crate::store::Memory;

/// Returns the best (lowest-drift) similarity between `candidate_vector`
/// and any retrieved memory's vector, or `0.0` when nothing was retrieved.
#[must_use]
pub fn grounding_score(candidate_vector: &[f32], retrieved: &[Memory]) -> f32 {
    retrieved
        .iter()
        .map(|m| 1.0 - drift(candidate_vector, &m.vector))
        .fold(0.0_f32, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceTrustCaps;
    use crate::ids::{MemoryId, ThreadId};
    use crate::store::MemorySource;

    fn memory(vector: Vec<f32>) -> Memory {
        let (m, _) = Memory::new(
            MemoryId::generate(),
            ThreadId::new("t1"),
            "text",
            vector,
            "hashing-v1",
            MemorySource::User,
            0.9,
            0.9,
            10,
            &SourceTrustCaps::default(),
        );
        m
    }

    #[test]
    fn no_memories_grounds_at_zero() {
        assert!((grounding_score(&[1.0, 0.0], &[]) - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn identical_vector_grounds_at_one() {
        let score = grounding_score(&[1.0, 0.0], &[memory(vec![1.0, 0.0])]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn picks_the_best_of_several_candidates() {
        let score = grounding_score(
            &[1.0, 0.0],
            &[memory(vec![0.0, 1.0]), memory(vec![1.0, 0.0])],
        );
        assert!((score - 1.0).abs() < 1e-6);
    }
}
