//! Contradiction detector (C4): rule-based, trust-weighted,
//! paraphrase-tolerant.
//!
//! Rules fire in a fixed order; there is no learned classifier in the
//! core path (§9 keeps an auxiliary classifier off by default — it may
//! score alongside but never overrides the rule set). The detector never
//! raises: an unknown slot is a no-op, and a missing vector is treated as
//! maximum drift.

mod classify;
mod rules;

pub use classify::{classify_type, has_correction_marker, has_temporal_marker};
pub use rules::{Candidate, DetectorInput, PriorFact, Verdict, detect};

use serde::{Deserialize, Serialize};

/// The type of a contradiction, per §3.1 and §4.4 step 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContradictionType {
    /// The new text carries an explicit correction marker ("actually",
    /// "I meant", "not X but Y", "sorry").
    Revision,
    /// The new text carries a temporal marker ("now", "used to", "last
    /// week", "moved", "was promoted").
    Temporal,
    /// Neither marker is present.
    Conflict,
    /// Equal normalized values with a confidence delta beyond
    /// `θ_conf_delta`.
    Duplicate,
}

/// Why the detector did or did not emit a contradiction, for logging and
/// for the paraphrase/trust-asymmetry laws in §8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionReason {
    /// Paraphrase tolerance suppressed a moderate-drift reword.
    Paraphrase,
    /// The low-trust filter treated one side as noise.
    LowTrust,
}
