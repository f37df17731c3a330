//! The turn report (§3.1): the ephemeral, structured result of one
//! orchestrator pass, handed back to the collaborator alongside (or
//! instead of) the emitted text.

use crate::disclosure::CaveatOutcome;
use crate::gates::{GateOutcome, GateScores, ResponseType};
use crate::ids::{ContradictionId, MemoryId};

/// Everything the orchestrator learned while processing one turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// The text actually emitted to the user: either the gated candidate,
    /// or a refusal/clarifying question if a gate rejected it.
    pub emitted_text: String,
    /// Whether `emitted_text` is considered grounded.
    pub grounded: bool,
    /// The reconstruction-gate outcome for this turn.
    pub gate_outcome: GateOutcome,
    /// How the candidate was classified.
    pub response_type: ResponseType,
    /// Per-gate and composite scores.
    pub scores: GateScores,
    /// Contradiction records newly opened this turn.
    pub contradictions_new: Vec<ContradictionId>,
    /// Contradiction records still open after this turn (including ones
    /// opened this turn).
    pub contradictions_active: Vec<ContradictionId>,
    /// Whether a caveat was required for this turn's disclosures.
    pub caveat_required: bool,
    /// Whether a caveat was actually present in `emitted_text`.
    pub caveat_present: bool,
    /// The caveat verification outcome.
    pub caveat_outcome: CaveatOutcome,
    /// A clarifying question, if one was substituted for the candidate.
    pub clarifying_question: Option<String>,
    /// Ids of memories retrieved and considered for this turn.
    pub retrieved_memory_ids: Vec<MemoryId>,
}
