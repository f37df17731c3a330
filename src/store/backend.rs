//! The persistence contract (§4.3, §6) and the retrieval options it
//! accepts.

use crate::config::Weights;
use crate::facts::Slot;
use crate::ids::{MemoryId, ThreadId};
use crate::Result;

use super::{Memory, ScoredMemory};

/// Inversion-of-control seam so the store can honor I5 ("exclude
/// deprecated") without depending on the contradiction ledger (C5 is
/// built on top of the store, not the other way around). The ledger
/// implements this trait; the orchestrator passes it through at
/// retrieval time exactly as §4.3's `retrieve(..., ledger)` contract
/// describes.
pub trait DeprecationOracle: Send + Sync {
    /// Returns true if `id` is superseded by a `RESOLVED` ledger record
    /// whose resolution method is `user_clarified` or `replaced` (I5).
    fn is_deprecated(&self, id: &MemoryId) -> bool;
}

/// A [`DeprecationOracle`] that never deprecates anything, for callers
/// that don't yet have a ledger wired in (tests, or `exclude_deprecated =
/// false` callers that still need to pass something).
pub struct NoDeprecation;

impl DeprecationOracle for NoDeprecation {
    fn is_deprecated(&self, _id: &MemoryId) -> bool {
        false
    }
}

/// Options controlling a single retrieval call.
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Maximum number of results to return.
    pub k: usize,
    /// Minimum trust a candidate must have to be considered.
    pub min_trust: f32,
    /// Whether to exclude memories deprecated per I5.
    pub exclude_deprecated: bool,
    /// Ranking weights to apply.
    pub weights: Weights,
    /// "Now", for recency decay; passed explicitly so retrieval is
    /// reproducible under test.
    pub now: u64,
}

impl RetrievalOptions {
    /// Builds retrieval options from the process configuration and a
    /// caller-supplied clock reading.
    #[must_use]
    pub fn new(k: usize, min_trust: f32, exclude_deprecated: bool, weights: Weights, now: u64) -> Self {
        Self {
            k,
            min_trust,
            exclude_deprecated,
            weights,
            now,
        }
    }
}

/// Persistence contract for the memory store (§4.3, §6).
///
/// Implementations own the authoritative copy of every memory in a
/// thread. Storage corruption must fail fast (`Err`) rather than
/// returning a degraded result — the orchestrator treats a failed
/// retrieval as "no memory", never as license to invent content.
pub trait MemoryBackend: Send + Sync {
    /// Stores a new memory and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] on I/O failure.
    fn insert(&mut self, memory: Memory) -> Result<MemoryId>;

    /// Retrieves a memory by id, ignoring soft-delete state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] on I/O failure.
    fn get(&self, id: &MemoryId) -> Result<Option<Memory>>;

    /// Lists memories for a slot, latest-first by `updated_at`. Excludes
    /// soft-deleted memories.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] on I/O failure.
    fn get_by_slot(&self, thread_id: &ThreadId, slot: &Slot) -> Result<Vec<Memory>>;

    /// Creates a new memory linked to `old_id` via `supersedes` (I3: the
    /// old memory is never destroyed).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] on I/O failure, or
    /// [`crate::Error::InvalidInput`] if `old_id` is unknown.
    fn supersede(&mut self, old_id: &MemoryId, new_memory: Memory) -> Result<MemoryId>;

    /// Soft-deletes a memory. Ledger entries referencing it are
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] on I/O failure.
    fn soft_delete(&mut self, id: &MemoryId) -> Result<()>;

    /// Ranks and returns candidates for a query embedding, thread-scoped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] on I/O failure.
    fn retrieve(
        &self,
        thread_id: &ThreadId,
        query_vector: &[f32],
        opts: &RetrievalOptions,
        deprecation: &dyn DeprecationOracle,
    ) -> Result<Vec<ScoredMemory>>;

    /// Destructively drops every memory belonging to `thread_id`. Used by
    /// the `reset_thread` entry point (§6); test harnesses are the
    /// primary caller, since production callers have no routine reason to
    /// discard memory wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] on I/O failure.
    fn reset_thread(&mut self, thread_id: &ThreadId) -> Result<()>;
}
