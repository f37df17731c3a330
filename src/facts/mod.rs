//! Fact extraction (C2): turns free text into typed slot/value facts.
//!
//! Extraction is deliberately high-precision, lower-recall: a slot without
//! a whitelist must require enough surrounding lexical context to avoid
//! capturing generic nouns, and extraction never guesses when a pattern
//! only weakly matches. Missing a fact is cheaper than injecting a wrong
//! one that trips a false contradiction downstream.

mod extractor;
mod slots;

pub use extractor::extract;
pub use slots::registry;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MemoryId;

/// A closed-set slot name. Distinct slots are never cross-compared; the
/// detector only ever looks up `prior_facts_by_slot[new_fact.slot]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(String);

impl Slot {
    /// Wraps a slot name. Only the registry in [`registry`] is expected to
    /// mint new slot names during extraction; this constructor is exposed
    /// for callers (e.g. test harnesses) that need to look a slot up by
    /// its registered name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the slot name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Slot {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A typed slot/value pair derived from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFact {
    /// The slot this fact belongs to.
    pub slot: Slot,
    /// The normalized value (lowercased, whitespace-collapsed, aliases
    /// collapsed).
    pub value: String,
    /// The memory this fact was extracted from, if it originated from a
    /// stored memory rather than a freshly-extracted candidate.
    pub origin_memory_id: Option<MemoryId>,
    /// Which extraction pattern matched, for auditability.
    pub pattern_id: String,
}

impl ExtractedFact {
    /// Creates a fresh candidate fact with no origin memory.
    #[must_use]
    pub fn candidate(slot: impl Into<Slot>, value: impl Into<String>, pattern_id: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            value: value.into(),
            origin_memory_id: None,
            pattern_id: pattern_id.into(),
        }
    }
}

impl From<String> for Slot {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Mapping from slot to the list of facts extracted for it.
pub type FactsBySlot = HashMap<Slot, Vec<ExtractedFact>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_slot_names_are_not_equal() {
        let a: Slot = "first_language".into();
        let b: Slot = "favorite_language".into();
        assert_ne!(a, b);
    }
}
