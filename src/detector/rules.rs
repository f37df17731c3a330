//! The detection algorithm itself (§4.4).

use std::collections::HashMap;

use crate::config::Thresholds;
use crate::embedding::{Vector, drift as embed_drift};
use crate::facts::Slot;
use crate::ids::MemoryId;
use crate::store::MemorySource;

use super::classify::classify_type;
use super::{ContradictionType, SuppressionReason};

/// The canonical prior fact for a slot: the latest non-deprecated value,
/// already selected by the caller (the orchestrator, which has access to
/// both the store and the ledger).
#[derive(Debug, Clone)]
pub struct PriorFact {
    /// The memory this value came from.
    pub memory_id: MemoryId,
    /// Normalized prior value.
    pub value: String,
    /// The full original statement text, used for paraphrase overlap.
    pub text: String,
    /// Embedding of the prior memory.
    pub vector: Vector,
    /// Trust of the prior memory at detection time.
    pub trust: f32,
    /// Confidence of the prior memory at detection time.
    pub confidence: f32,
}

/// A freshly-extracted candidate fact to compare against its prior.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Normalized new value.
    pub value: String,
    /// Embedding of the new statement.
    pub vector: Vector,
    /// Trust assigned to the new memory (post I2 cap, if applicable).
    pub trust: f32,
    /// Confidence assigned to the new memory.
    pub confidence: f32,
    /// Provenance of the new memory.
    pub source: MemorySource,
}

/// Input to a single detection pass: the new statement's text plus one
/// candidate fact per slot, matched against that slot's canonical prior.
pub struct DetectorInput<'a> {
    /// The raw new statement (used for correction/temporal markers and
    /// paraphrase key-element overlap).
    pub new_text: &'a str,
    /// New candidate facts, keyed by slot.
    pub candidates: HashMap<Slot, Candidate>,
    /// Canonical prior fact per slot, where one exists.
    pub priors: HashMap<Slot, PriorFact>,
    /// Active thresholds.
    pub thresholds: Thresholds,
    /// Whether the paraphrase-tolerance rule is enabled
    /// (`enable_paraphrase_tolerance`).
    pub paraphrase_tolerance_enabled: bool,
}

/// The outcome of comparing one slot's candidate against its prior.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// A contradiction was detected.
    Contradiction {
        /// The slot in conflict.
        slot: Slot,
        /// The memory holding the superseded value.
        old_memory_id: MemoryId,
        /// The superseded value.
        old_value: String,
        /// The newly asserted value.
        new_value: String,
        /// How the contradiction was classified.
        contradiction_type: ContradictionType,
        /// Embedding drift between the two statements.
        drift: f32,
        /// Prior trust at detection time.
        trust_old: f32,
        /// New trust at detection time.
        trust_new: f32,
        /// Prior confidence at detection time.
        conf_old: f32,
        /// New confidence at detection time.
        conf_new: f32,
    },
    /// Equal normalized values with a confidence delta large enough to be
    /// worth a silent audit record (§9: not user-disclosed).
    Duplicate {
        /// The slot involved.
        slot: Slot,
        /// The memory holding the prior value.
        old_memory_id: MemoryId,
        /// The (shared) value.
        value: String,
        /// Prior confidence.
        conf_old: f32,
        /// New confidence.
        conf_new: f32,
    },
    /// A contradiction rule considered the pair and suppressed it.
    Suppressed {
        /// The slot involved.
        slot: Slot,
        /// Why suppression fired.
        reason: SuppressionReason,
    },
}

/// Runs the trust/paraphrase gate for every slot present in both the new
/// candidates and the prior facts. Slots with no prior are skipped
/// entirely per §4.4 step 1a. The detector never raises.
#[must_use]
pub fn detect(input: &DetectorInput<'_>) -> Vec<Verdict> {
    let mut out = Vec::new();
    for (slot, candidate) in &input.candidates {
        let Some(prior) = input.priors.get(slot) else {
            continue;
        };

        if candidate.value == prior.value {
            let conf_delta = (prior.confidence - candidate.confidence).abs();
            if conf_delta > input.thresholds.conf_delta {
                out.push(Verdict::Duplicate {
                    slot: slot.clone(),
                    old_memory_id: prior.memory_id.clone(),
                    value: candidate.value.clone(),
                    conf_old: prior.confidence,
                    conf_new: candidate.confidence,
                });
            }
            continue;
        }

        let drift = embed_drift(&candidate.vector, &prior.vector);

        if input.paraphrase_tolerance_enabled
            && drift >= input.thresholds.paraphrase_low
            && drift <= input.thresholds.paraphrase_high
            && key_element_overlap(input.new_text, &prior.text) >= input.thresholds.paraphrase_overlap
        {
            out.push(Verdict::Suppressed {
                slot: slot.clone(),
                reason: SuppressionReason::Paraphrase,
            });
            continue;
        }

        let min_trust = prior.trust.min(candidate.trust);
        let trust_delta = (prior.trust - candidate.trust).abs();
        if min_trust < input.thresholds.low_trust_floor && trust_delta >= input.thresholds.low_trust_delta {
            out.push(Verdict::Suppressed {
                slot: slot.clone(),
                reason: SuppressionReason::LowTrust,
            });
            continue;
        }

        let fires_high_drift = drift > input.thresholds.contra;
        let fires_confidence_drop = (prior.confidence - candidate.confidence) > input.thresholds.drop
            && drift > input.thresholds.min;
        let fires_fallback_drift = matches!(candidate.source, MemorySource::LlmOutput | MemorySource::Fallback)
            && drift > input.thresholds.fallback;

        if fires_high_drift || fires_confidence_drop || fires_fallback_drift {
            let contradiction_type = classify_type(input.new_text);
            out.push(Verdict::Contradiction {
                slot: slot.clone(),
                old_memory_id: prior.memory_id.clone(),
                old_value: prior.value.clone(),
                new_value: candidate.value.clone(),
                contradiction_type,
                drift,
                trust_old: prior.trust,
                trust_new: candidate.trust,
                conf_old: prior.confidence,
                conf_new: candidate.confidence,
            });
        }
    }
    out
}

/// "Key elements" are numeric tokens and proper-noun-shaped tokens (an
/// initial capital) that are not the first token of the text. Returns the
/// fraction of the smaller key-element set that also appears in the
/// other, which is what the spec's "share >= 70%" describes.
fn key_element_overlap(a: &str, b: &str) -> f32 {
    let set_a = key_elements(a);
    let set_b = key_elements(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let shared = set_a.intersection(&set_b).count();
    let smaller = set_a.len().min(set_b.len());
    shared as f32 / smaller as f32
}

fn key_elements(text: &str) -> std::collections::HashSet<String> {
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            let is_numeric = t.chars().any(|c| c.is_ascii_digit());
            let is_proper_noun = *i > 0
                && t.chars().next().is_some_and(char::is_uppercase);
            is_numeric || is_proper_noun
        })
        .map(|(_, t)| t.to_lowercase())
        .collect()
}
