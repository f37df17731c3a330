//! Contradiction ledger (C5): typed conflict records with a write-only
//! lifecycle state machine.
//!
//! The ledger is append-only for history preservation (I3): status
//! changes are recorded as events, never destructive edits. A `RESOLVED`
//! record is never reopened; a new `OPEN` record is created if the values
//! conflict again.

mod fsm;
mod inmemory;
mod record;

pub use fsm::{ContradictionStatus, Resolution, ResolutionMethod};
pub use inmemory::InMemoryLedger;
pub use record::ContradictionRecord;

use crate::detector::ContradictionType;
use crate::facts::Slot;
use crate::ids::{ContradictionId, MemoryId, ThreadId};
use crate::store::DeprecationOracle;
use crate::Result;

/// Persistence contract for the contradiction ledger (§4.5, §6).
pub trait ContradictionLedger: Send + Sync {
    /// Records a freshly-detected contradiction and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn record(&mut self, record: ContradictionRecord) -> Result<ContradictionId>;

    /// Returns every OPEN record for a thread.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn find_open(&self, thread_id: &ThreadId) -> Result<Vec<ContradictionRecord>>;

    /// Returns true if `memory_id` is referenced (as either side) by an
    /// OPEN record.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn has_open_for_memory(&self, memory_id: &MemoryId) -> Result<bool>;

    /// Transitions a record to a new status, recording the transition as
    /// an event (I3). Never reopens a `RESOLVED` record.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure or an invalid transition.
    fn update_status(
        &mut self,
        id: &ContradictionId,
        new_status: ContradictionStatus,
        resolution: Option<Resolution>,
    ) -> Result<()>;

    /// Scans OPEN contradictions for a thread; where `new_facts[slot]`
    /// equals either side of an open record, marks that side winning and
    /// transitions the record to `RESOLVED` with method
    /// `user_clarified`. Idempotent: applying it twice with the same
    /// facts yields the same ledger state.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn resolve_from_assertion(
        &mut self,
        thread_id: &ThreadId,
        new_facts: &std::collections::HashMap<Slot, String>,
    ) -> Result<Vec<ContradictionId>>;

    /// Returns every `RESOLVED` record for a thread.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn get_resolved(&self, thread_id: &ThreadId) -> Result<Vec<ContradictionRecord>>;

    /// Number of silently-audited DUPLICATE records for a thread. Per §9,
    /// duplicates are a silent audit event, never a user-visible
    /// disclosure.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn duplicate_count(&self, thread_id: &ThreadId) -> Result<usize>;

    /// Records a silently-audited DUPLICATE event for a thread. Per §9,
    /// duplicates are never disclosed to the user, only counted.
    fn record_duplicate(&mut self, thread_id: &ThreadId);

    /// Destructively drops every ledger record for `thread_id`. Used by
    /// the `reset_thread` entry point (§6); test harnesses are the
    /// primary caller.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn reset_thread(&mut self, thread_id: &ThreadId) -> Result<()>;
}

/// A ledger the orchestrator can hold as one trait object and still hand
/// to the memory store as a [`DeprecationOracle`] (trait upcasting from
/// `dyn LedgerHandle` to `dyn DeprecationOracle`), closing the
/// inversion-of-control seam [`crate::store::DeprecationOracle`] opened.
pub trait LedgerHandle: ContradictionLedger + DeprecationOracle {}

impl<T: ContradictionLedger + DeprecationOracle> LedgerHandle for T {}
