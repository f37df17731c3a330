//! The contradiction lifecycle state machine (§4.5).
//!
//! ```text
//!           detect
//!   (none) ───────► OPEN
//!                   │
//!                   │ user re-asserts one side, or supplies a new
//!                   │ canonical value
//!                   ▼
//!               RESOLVING ──► RESOLVED  (winning_memory_id set)
//!                   │
//!                   │ user explicitly keeps both (contextual)
//!                   ▼
//!               ACCEPTED  (both sides remain active; no disclosure
//!                          required afterwards)
//!
//!           any terminal state + time > retention → ARCHIVED
//! ```
//!
//! Transitions are write-only: a `RESOLVED` record is never reopened.

use serde::{Deserialize, Serialize};

use crate::ids::MemoryId;
use crate::Error;

/// Lifecycle state of a contradiction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContradictionStatus {
    /// Freshly detected; disclosure is required for any retrieval
    /// touching either side.
    Open,
    /// A resolution is underway (the user re-asserted one side, or
    /// supplied a new canonical value) but not yet finalized.
    Resolving,
    /// Finalized; one side won per `Resolution::winning_memory_id`.
    Resolved,
    /// The user explicitly kept both sides; no further disclosure
    /// required.
    Accepted,
    /// Retained for history but no longer live for any disclosure
    /// purpose.
    Archived,
}

impl ContradictionStatus {
    /// Returns true if this status still requires disclosure on
    /// retrieval (only `Open` does — `Resolving` is an in-flight,
    /// non-terminal state the spec does not require disclosure for
    /// beyond what `Open` already covers, since a record enters
    /// `Resolving` only on the way to being resolved within the same
    /// turn).
    #[must_use]
    pub const fn requires_disclosure(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if this is a terminal state eligible for archival
    /// after the retention window elapses.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Accepted | Self::Archived)
    }

    /// Validates a transition. `Resolved` is a dead end: attempting to
    /// move away from it is rejected so callers create a fresh `Open`
    /// record instead (§8: "never transitions from RESOLVED back to
    /// OPEN").
    pub fn validate_transition(self, to: Self) -> Result<(), Error> {
        if self == Self::Resolved && to != Self::Archived {
            return Err(Error::InvalidInput(format!(
                "cannot transition a RESOLVED record to {to:?}; open a new record instead"
            )));
        }
        Ok(())
    }
}

/// The method by which a contradiction's resolution was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionMethod {
    /// The user explicitly clarified which side is correct.
    UserClarified,
    /// The old value was replaced by an unambiguous new canonical value.
    Replaced,
    /// The user explicitly chose to keep both sides.
    KeptBoth,
}

/// Resolution details attached to a terminal ledger record.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// How the resolution was reached.
    pub method: ResolutionMethod,
    /// The message/turn that triggered the resolution, if known.
    pub message_id: Option<String>,
    /// When the resolution occurred (Unix epoch seconds).
    pub resolved_at: u64,
    /// Which memory won, when applicable.
    pub winning_memory_id: Option<MemoryId>,
}
