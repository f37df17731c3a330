//! Self-questioning (C8): turns a gate rejection into a single clarifying
//! question, governed by the disclosure budget so the same slot can't be
//! re-asked every turn.

use crate::disclosure::DisclosureBudget;
use crate::facts::Slot;
use crate::ledger::ContradictionRecord;

/// Why a clarifying question is being generated, mapped 1:1 onto the
/// failure that triggered it (§4.8).
#[derive(Debug, Clone)]
pub enum FailureReason<'a> {
    /// An open contradiction on `slot` is still unresolved.
    Contradiction {
        /// The slot in conflict.
        slot: &'a Slot,
        /// The contradiction record driving the question.
        record: &'a ContradictionRecord,
    },
    /// The grounding gate found nothing to anchor the candidate to.
    Grounding,
    /// Retrieval was empty and the user is asserting something new.
    MemoryMiss,
    /// The candidate's shape didn't match the user's apparent intent.
    IntentMismatch,
}

/// Generates a clarifying question for `reason`, or `None` if the
/// disclosure budget for the relevant slot is exhausted this window.
///
/// Never fabricates a value and never presents the system's own
/// hypothesis as settled fact — every question names only values already
/// on record.
pub fn question(reason: &FailureReason<'_>, turn: u64, budget: &mut DisclosureBudget) -> Option<String> {
    let slot = match reason {
        FailureReason::Contradiction { slot, .. } => Some((*slot).clone()),
        FailureReason::Grounding | FailureReason::MemoryMiss | FailureReason::IntentMismatch => None,
    };

    if let Some(slot) = &slot {
        if !budget.try_consume(slot, turn) {
            return None;
        }
    }

    Some(match reason {
        FailureReason::Contradiction { record, .. } => format!(
            "I previously recorded {}; you're now saying {}. Which should I use going forward?",
            record.old_value, record.new_value
        ),
        FailureReason::Grounding => {
            "I couldn't tie this to anything I've already stored. Can you tell me where you last saw this?"
                .to_string()
        }
        FailureReason::MemoryMiss => {
            "I don't have that yet — would you like me to remember it?".to_string()
        }
        FailureReason::IntentMismatch => {
            "Did you want me to store this, or answer a question about it?".to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisclosureBudgetConfig;
    use crate::detector::ContradictionType;
    use crate::ids::{ContradictionId, MemoryId, ThreadId};
    use crate::ledger::ContradictionStatus;

    fn record() -> ContradictionRecord {
        ContradictionRecord {
            id: ContradictionId::new("c1"),
            thread_id: ThreadId::new("t1"),
            slot: Slot::new("employer"),
            old_memory_id: MemoryId::new("m1"),
            new_memory_id: MemoryId::new("m2"),
            old_value: "Globex".to_string(),
            new_value: "Acme".to_string(),
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
    fn contradiction_question_names_both_values() {
        let r = record();
        let slot = Slot::new("employer");
        let mut budget = DisclosureBudget::new(DisclosureBudgetConfig::default());
        let q = question(&FailureReason::Contradiction { slot: &slot, record: &r }, 1, &mut budget)
            .expect("within budget");
        assert!(q.contains("Globex"));
        assert!(q.contains("Acme"));
    }

    #[test]
    fn grounding_failure_never_names_a_fabricated_value() {
        let mut budget = DisclosureBudget::new(DisclosureBudgetConfig::default());
        let q = question(&FailureReason::Grounding, 1, &mut budget).expect("no budget gate");
        assert!(q.contains("couldn't tie this"));
    }

    #[test]
    fn budget_exhaustion_suppresses_a_repeat_question_on_the_same_slot() {
        let r = record();
        let slot = Slot::new("employer");
        let mut budget = DisclosureBudget::new(DisclosureBudgetConfig {
            max_per_window: 1,
            window_turns: 5,
        });
        let first = question(&FailureReason::Contradiction { slot: &slot, record: &r }, 1, &mut budget);
        let second = question(&FailureReason::Contradiction { slot: &slot, record: &r }, 2, &mut budget);
        assert!(first.is_some());
        assert!(second.is_none());
    }
}
