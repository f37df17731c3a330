//! Disclosure enforcer (C7): ensures an open contradiction touching a
//! retrieved memory is never silently papered over.
//!
//! Injection happens twice per turn: once pre-generation, instructing the
//! language layer to include the caveat, and once post-generation,
//! verifying it actually landed in the emitted text. Both paths share the
//! same [`caveat::has_caveat`] detector so "the enforcer asked for it" and
//! "the enforcer saw it" can never silently disagree.

mod budget;
mod caveat;

pub use budget::DisclosureBudget;
pub use caveat::{caveat_sentence, caveat_sentence_for, has_caveat, is_intense};

use crate::ids::MemoryId;
use crate::ledger::ContradictionRecord;
use crate::store::Memory;

/// The result of checking an emitted output against what disclosure it
/// actually needed (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaveatOutcome {
    /// A caveat was required and present.
    DisclosedNeeded,
    /// A caveat was present but nothing required it; tracked as noise, not
    /// a failure.
    DisclosedUnnecessary,
    /// A caveat was required but absent — a hard failure.
    MissingNeeded,
    /// No caveat was required and none was present.
    AbsentCorrect,
}

/// Returns the subset of `open_records` that reference a memory present in
/// `retrieved` — i.e. the contradictions this turn's disclosure must cover.
#[must_use]
pub fn required_disclosures<'a>(
    retrieved: &[Memory],
    open_records: &'a [ContradictionRecord],
) -> Vec<&'a ContradictionRecord> {
    let retrieved_ids: Vec<&MemoryId> = retrieved.iter().map(|m| &m.id).collect();
    open_records
        .iter()
        .filter(|r| retrieved_ids.iter().any(|id| r.references(id)))
        .collect()
}

/// Pre-generation injection: appends a deterministic caveat sentence per
/// required disclosure to `candidate_output`. Idempotent: calling it twice
/// back to back does not duplicate a caveat already present. `intense`
/// selects the direct-sentence phrasing over the parenthetical aside, per
/// `enable_emotion_intensity` (§4.9).
#[must_use]
pub fn inject(candidate_output: &str, disclosures: &[&ContradictionRecord], intense: bool) -> String {
    if disclosures.is_empty() || has_caveat(candidate_output) {
        return candidate_output.to_string();
    }
    let mut out = candidate_output.to_string();
    for record in disclosures {
        out.push_str(&caveat_sentence_for(&record.old_value, &record.new_value, intense));
    }
    out
}

/// Post-generation verification: classifies `emitted_output` against
/// whether a caveat was actually required.
#[must_use]
pub fn verify(emitted_output: &str, required: bool) -> CaveatOutcome {
    match (required, has_caveat(emitted_output)) {
        (true, true) => CaveatOutcome::DisclosedNeeded,
        (false, true) => CaveatOutcome::DisclosedUnnecessary,
        (true, false) => CaveatOutcome::MissingNeeded,
        (false, false) => CaveatOutcome::AbsentCorrect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ContradictionType;
    use crate::facts::Slot;
    use crate::ids::{ContradictionId, ThreadId};
    use crate::ledger::ContradictionStatus;

    fn record(old_id: &str, new_id: &str, old: &str, new: &str) -> ContradictionRecord {
        ContradictionRecord {
            id: ContradictionId::new("c1"),
            thread_id: ThreadId::new("t1"),
            slot: Slot::new("employer"),
            old_memory_id: MemoryId::new(old_id),
            new_memory_id: MemoryId::new(new_id),
            old_value: old.to_string(),
            new_value: new.to_string(),
            contradiction_type: ContradictionType::Conflict,
            status: ContradictionStatus::Open,
            drift: 0.5,
            trust_old: 0.9,
            trust_new: 0.9,
            conf_old: 0.9,
            conf_new: 0.9,
            detected_at: 1,
            updated_at: 1,
            resolution: None,
        }
    }

    #[test]
    fn inject_adds_a_caveat_when_one_is_required_and_absent() {
        let r = record("m1", "m2", "Globex", "Acme");
        let out = inject("You work at Acme.", &[&r], false);
        assert!(has_caveat(&out));
        assert!(out.contains("Globex"));
    }

    #[test]
    fn inject_is_idempotent_when_a_caveat_is_already_present() {
        let r = record("m1", "m2", "Globex", "Acme");
        let text = "You work at Acme (previously Globex, now Acme).";
        let out = inject(text, &[&r], false);
        assert_eq!(out, text);
    }

    #[test]
    fn verify_flags_missing_required_caveat_as_hard_failure() {
        assert_eq!(verify("You work at Acme.", true), CaveatOutcome::MissingNeeded);
    }

    #[test]
    fn verify_flags_unnecessary_caveat_as_noise_not_failure() {
        assert_eq!(
            verify("You work at Acme (previously Globex).", false),
            CaveatOutcome::DisclosedUnnecessary
        );
    }

    #[test]
    fn required_disclosures_filters_by_retrieved_membership() {
        let r = record("m1", "m2", "Globex", "Acme");
        let mem = crate::store::Memory::new(
            MemoryId::new("m2"),
            ThreadId::new("t1"),
            "You work at Acme.",
            vec![1.0],
            "hashing-v1",
            crate::store::MemorySource::User,
            0.9,
            0.9,
            1,
            &crate::config::SourceTrustCaps::default(),
        )
        .0;
        let found = required_disclosures(&[mem], std::slice::from_ref(&r));
        assert_eq!(found.len(), 1);
    }
}
