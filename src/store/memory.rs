//! The `Memory` entity and its construction-time invariants.

use crate::config::SourceTrustCaps;
use crate::embedding::Vector;
use crate::ids::{MemoryId, ThreadId};

/// Provenance of a memory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemorySource {
    /// Directly asserted by the user.
    User,
    /// Inserted by the system (e.g. derived defaults).
    System,
    /// Produced by the external language generator (C10 step 6/7).
    LlmOutput,
    /// Produced by an external tool call.
    Tool,
    /// A degraded-mode fallback value (e.g. generator unavailable).
    Fallback,
}

impl MemorySource {
    /// Returns true if this source is subject to the I2 trust cap.
    #[must_use]
    pub const fn is_trust_capped(self) -> bool {
        matches!(self, Self::LlmOutput | Self::Fallback)
    }
}

/// The unit of stored knowledge (§3.1).
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    /// Stable opaque identifier, unique per thread.
    pub id: MemoryId,
    /// Which conversation/user this belongs to. All queries are
    /// thread-scoped; the store exposes no cross-thread reads.
    pub thread_id: ThreadId,
    /// The raw statement.
    pub text: String,
    /// Unit-norm embedding of `text`.
    pub vector: Vector,
    /// Identifier of the embedding model that produced `vector`.
    pub embedding_model_id: String,
    /// Provenance of this memory.
    pub source: MemorySource,
    /// Long-lived belief that this memory reflects reality, in `[0, 1]`.
    pub trust: f32,
    /// Short-lived belief that this memory was correctly captured, in
    /// `[0, 1]`.
    pub confidence: f32,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
    /// A memory this one refines. The superseded memory is never deleted.
    pub supersedes: Option<MemoryId>,
    /// Soft-delete flag.
    pub active: bool,
}

impl Memory {
    /// Constructs a memory, enforcing the I2 source trust cap.
    ///
    /// Returns the constructed memory and whether the requested trust had
    /// to be clamped to satisfy I2. Callers (the store's `insert`) are
    /// expected to log an invariant-violation event when the second
    /// element is `true`, per the error handling design (§7): clamped, not
    /// rejected.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MemoryId,
        thread_id: ThreadId,
        text: impl Into<String>,
        vector: Vector,
        embedding_model_id: impl Into<String>,
        source: MemorySource,
        trust: f32,
        confidence: f32,
        now: u64,
        caps: &SourceTrustCaps,
    ) -> (Self, bool) {
        let (clamped_trust, was_clamped) = apply_trust_cap(source, trust, caps);
        let memory = Self {
            id,
            thread_id,
            text: text.into(),
            vector,
            embedding_model_id: embedding_model_id.into(),
            source,
            trust: clamped_trust.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            created_at: now,
            updated_at: now,
            supersedes: None,
            active: true,
        };
        (memory, was_clamped)
    }

    /// Returns true if this memory has been soft-deleted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Applies the I2 source trust cap, returning the (possibly clamped)
/// trust and whether clamping occurred.
fn apply_trust_cap(source: MemorySource, trust: f32, caps: &SourceTrustCaps) -> (f32, bool) {
    if !source.is_trust_capped() {
        return (trust, false);
    }
    let cap = match source {
        MemorySource::LlmOutput => caps.llm_output,
        MemorySource::Fallback => caps.fallback,
        _ => return (trust, false),
    };
    if trust > cap {
        (cap, true)
    } else {
        (trust, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> SourceTrustCaps {
        SourceTrustCaps::default()
    }

    #[test]
    fn llm_output_trust_is_capped_at_insertion() {
        let (m, clamped) = Memory::new(
            MemoryId::generate(),
            ThreadId::new("t1"),
            "hello",
            vec![1.0],
            "hashing-v1",
            MemorySource::LlmOutput,
            0.9,
            0.9,
            1,
            &caps(),
        );
        assert!(clamped);
        assert!(m.trust <= 0.3);
    }

    #[test]
    fn fallback_trust_is_capped_regardless_of_input() {
        let (m, clamped) = Memory::new(
            MemoryId::generate(),
            ThreadId::new("t1"),
            "hello",
            vec![1.0],
            "hashing-v1",
            MemorySource::Fallback,
            1.0,
            1.0,
            1,
            &caps(),
        );
        assert!(clamped);
        assert!(m.trust <= 0.3);
    }

    #[test]
    fn user_trust_is_never_capped() {
        let (m, clamped) = Memory::new(
            MemoryId::generate(),
            ThreadId::new("t1"),
            "hello",
            vec![1.0],
            "hashing-v1",
            MemorySource::User,
            0.95,
            0.95,
            1,
            &caps(),
        );
        assert!(!clamped);
        assert!((m.trust - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn low_llm_output_trust_is_left_untouched() {
        let (m, clamped) = Memory::new(
            MemoryId::generate(),
            ThreadId::new("t1"),
            "hello",
            vec![1.0],
            "hashing-v1",
            MemorySource::LlmOutput,
            0.1,
            0.5,
            1,
            &caps(),
        );
        assert!(!clamped);
        assert!((m.trust - 0.1).abs() < f32::EPSILON);
    }
}
