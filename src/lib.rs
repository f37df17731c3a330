//! # groundkeep
//!
//! A contradiction-aware grounding and memory governance engine for
//! language-model-backed assistants whose context evolves over time.
//!
//! groundkeep answers three coupled questions on every turn:
//!
//! 1. Which prior memories support or conflict with the new input and the
//!    proposed output?
//! 2. Is the proposed output grounded in memories the system actually
//!    trusts, or is the language layer drifting?
//! 3. When conflicts exist, is disclosure of that conflict actually
//!    reaching the user?
//!
//! The crate governs and annotates text produced elsewhere; it does not
//! generate prose itself, and it never resolves a contradiction without an
//! explicit resolution event.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

pub mod clarify;
pub mod config;
pub mod detector;
pub mod disclosure;
pub mod embedding;
pub mod facts;
pub mod gates;
mod ids;
pub mod ledger;
pub mod observability;
pub mod orchestrator;
pub mod store;

pub use config::{Config, FeatureFlags, Thresholds, Weights};
pub use embedding::{Embedder, Vector, drift};
pub use facts::{ExtractedFact, Slot};
pub use ids::{ContradictionId, MemoryId, ThreadId};
pub use ledger::{ContradictionRecord, ContradictionStatus, Resolution, ResolutionMethod};
pub use orchestrator::{IngestOptions, Orchestrator, ResetTarget, TurnReport};
pub use store::{Memory, MemorySource};

/// Error type for groundkeep operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed text, unknown slot name, bad config value |
/// | `OperationFailed` | Storage I/O error, embedder failure |
/// | `StorageUnavailable` | Persistence backend is unreachable or corrupt |
/// | `GeneratorUnavailable` | External generator timed out or errored |
/// | `InvariantViolation` | A programmer error that was clamped, not propagated |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The persistence layer is unavailable. Fatal to the current turn;
    /// per the error handling design, the orchestrator must never proceed
    /// to generation after this.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The external generator timed out or otherwise failed.
    #[error("generator unavailable: {0}")]
    GeneratorUnavailable(String),

    /// An internal invariant was violated by caller input. The offending
    /// value is clamped at the call site; this variant exists so callers
    /// can log and assert it never fires in steady state, it is not meant
    /// to abort a turn.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Result type alias for groundkeep operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidInput("bad slot".to_string());
        assert_eq!(err.to_string(), "invalid input: bad slot");

        let err = Error::OperationFailed {
            operation: "retrieve".to_string(),
            cause: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'retrieve' failed: disk full");
    }

    #[test]
    fn current_timestamp_is_reasonable() {
        let ts = current_timestamp();
        assert!(ts > 1_700_000_000);
    }
}
