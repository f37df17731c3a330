//! Memory gate (§4.6 step 2): are the facts the candidate asserts actually
//! present in the memories that were retrieved for this turn?

use crate::facts::FactsBySlot;
use crate::store::Memory;

/// Result of comparing a candidate's asserted facts against retrieved
/// memory text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryGateResult {
    /// How many distinct asserted values were checked.
    pub total: usize,
    /// How many were found, exactly or by containment, in retrieved text.
    pub matched: usize,
    /// `matched / total`, or `1.0` when there was nothing to check.
    pub score: f32,
}

/// Scores a candidate's facts against the text of retrieved memories.
///
/// Exact equality of the normalized value against a memory's normalized
/// text scores a match. Substring containment also counts, but only when
/// the asserted value is the shorter of the two strings — a long candidate
/// value containing a short, coincidental memory fragment must not count
/// as support (§4.6 step 2).
#[must_use]
pub fn memory_gate_score(candidate_facts: &FactsBySlot, retrieved: &[Memory]) -> MemoryGateResult {
    let haystacks: Vec<String> = retrieved.iter().map(|m| m.text.to_lowercase()).collect();

    let values: Vec<&str> = candidate_facts
        .values()
        .flatten()
        .map(|f| f.value.as_str())
        .collect();

    if values.is_empty() {
        return MemoryGateResult {
            total: 0,
            matched: 0,
            score: 1.0,
        };
    }

    let mut matched = 0usize;
    for value in &values {
        let needle = value.to_lowercase();
        let supported = haystacks.iter().any(|hay| {
            hay == &needle || (needle.len() <= hay.len() && hay.contains(&needle))
        });
        if supported {
            matched += 1;
        }
    }

    MemoryGateResult {
        total: values.len(),
        matched,
        score: matched as f32 / values.len() as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{ExtractedFact, Slot};
    use crate::ids::{MemoryId, ThreadId};
    use crate::store::MemorySource;
    use std::collections::HashMap;

    fn memory(text: &str) -> Memory {
        let (m, _) = Memory::new(
            MemoryId::generate(),
            ThreadId::new("t1"),
            text,
            vec![1.0],
            "hashing-v1",
            MemorySource::User,
            0.9,
            0.9,
            10,
            &crate::config::SourceTrustCaps::default(),
        );
        m
    }

    #[test]
    fn no_candidate_facts_trivially_scores_one() {
        let result = memory_gate_score(&FactsBySlot::new(), &[memory("anything")]);
        assert!((result.score - 1.0).abs() < f32::EPSILON);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn supported_value_scores_full_match() {
        let mut facts = HashMap::new();
        facts.insert(
            Slot::new("employer"),
            vec![ExtractedFact::candidate("employer", "acme", "employer_at")],
        );
        let result = memory_gate_score(&facts, &[memory("I work at Acme.")]);
        assert_eq!(result.matched, 1);
        assert!((result.score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unsupported_value_scores_zero() {
        let mut facts = HashMap::new();
        facts.insert(
            Slot::new("employer"),
            vec![ExtractedFact::candidate("employer", "globex", "employer_at")],
        );
        let result = memory_gate_score(&facts, &[memory("I work at Acme.")]);
        assert_eq!(result.matched, 0);
        assert!((result.score - 0.0).abs() < f32::EPSILON);
    }
}
