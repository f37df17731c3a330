//! The `ContradictionRecord` entity (§3.1).

use crate::detector::ContradictionType;
use crate::facts::Slot;
use crate::ids::{ContradictionId, MemoryId, ThreadId};

use super::fsm::{ContradictionStatus, Resolution};

/// A typed conflict between two memories on the same slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ContradictionRecord {
    /// Stable opaque identifier.
    pub id: ContradictionId,
    /// Which thread this record belongs to.
    pub thread_id: ThreadId,
    /// The slot in conflict.
    pub slot: Slot,
    /// The memory holding the superseded value.
    pub old_memory_id: MemoryId,
    /// The memory holding the new value.
    pub new_memory_id: MemoryId,
    /// The superseded value.
    pub old_value: String,
    /// The newly asserted value.
    pub new_value: String,
    /// How this conflict was classified.
    pub contradiction_type: ContradictionType,
    /// Current lifecycle state.
    pub status: ContradictionStatus,
    /// Embedding drift between the two memories at detection time.
    pub drift: f32,
    /// Prior trust at detection time.
    pub trust_old: f32,
    /// New trust at detection time.
    pub trust_new: f32,
    /// Prior confidence at detection time.
    pub conf_old: f32,
    /// New confidence at detection time.
    pub conf_new: f32,
    /// When this record was first detected (Unix epoch seconds).
    pub detected_at: u64,
    /// When this record was last updated (Unix epoch seconds).
    pub updated_at: u64,
    /// Resolution details, once resolved.
    pub resolution: Option<Resolution>,
}

impl ContradictionRecord {
    /// Returns true if `memory_id` is either side of this record.
    #[must_use]
    pub fn references(&self, memory_id: &MemoryId) -> bool {
        &self.old_memory_id == memory_id || &self.new_memory_id == memory_id
    }
}
