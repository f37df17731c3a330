//! An in-process `ContradictionLedger`, thread-scoped, insertion-ordered.

use std::collections::HashMap;

use tracing::instrument;

use crate::facts::Slot;
use crate::ids::{ContradictionId, MemoryId, ThreadId};
use crate::store::DeprecationOracle;
use crate::{Error, Result};

use super::fsm::{ContradictionStatus, Resolution, ResolutionMethod};
use super::record::ContradictionRecord;
use super::ContradictionLedger;

/// An in-memory implementation of [`ContradictionLedger`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: HashMap<ContradictionId, ContradictionRecord>,
    thread_order: HashMap<ThreadId, Vec<ContradictionId>>,
    duplicate_counts: HashMap<ThreadId, usize>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn resolved_deprecates(&self, id: &MemoryId) -> bool {
        self.records.values().any(|r| {
            r.status == ContradictionStatus::Resolved
                && r.references(id)
                && r.resolution.as_ref().is_some_and(|res| {
                    matches!(
                        res.method,
                        ResolutionMethod::UserClarified | ResolutionMethod::Replaced
                    ) && res.winning_memory_id.as_ref() != Some(id)
                })
        })
    }
}

impl ContradictionLedger for InMemoryLedger {
    #[instrument(skip(self, record), fields(thread_id = %record.thread_id))]
    fn record(&mut self, record: ContradictionRecord) -> Result<ContradictionId> {
        let id = record.id.clone();
        self.thread_order
            .entry(record.thread_id.clone())
            .or_default()
            .push(id.clone());
        self.records.insert(id.clone(), record);
        Ok(id)
    }

    fn find_open(&self, thread_id: &ThreadId) -> Result<Vec<ContradictionRecord>> {
        let Some(ids) = self.thread_order.get(thread_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|r| r.status == ContradictionStatus::Open)
            .cloned()
            .collect())
    }

    fn has_open_for_memory(&self, memory_id: &MemoryId) -> Result<bool> {
        Ok(self
            .records
            .values()
            .any(|r| r.status == ContradictionStatus::Open && r.references(memory_id)))
    }

    #[instrument(skip(self, resolution))]
    fn update_status(
        &mut self,
        id: &ContradictionId,
        new_status: ContradictionStatus,
        resolution: Option<Resolution>,
    ) -> Result<()> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| Error::InvalidInput(format!("unknown contradiction {id}")))?;
        record.status.validate_transition(new_status)?;
        record.status = new_status;
        if resolution.is_some() {
            record.resolution = resolution;
        }
        Ok(())
    }

    #[instrument(skip(self, new_facts), fields(thread_id = %thread_id))]
    fn resolve_from_assertion(
        &mut self,
        thread_id: &ThreadId,
        new_facts: &HashMap<Slot, String>,
    ) -> Result<Vec<ContradictionId>> {
        let Some(ids) = self.thread_order.get(thread_id).cloned() else {
            return Ok(Vec::new());
        };
        let mut resolved = Vec::new();
        for id in ids {
            let Some(record) = self.records.get_mut(&id) else {
                continue;
            };
            if record.status != ContradictionStatus::Open {
                continue;
            }
            let Some(asserted) = new_facts.get(&record.slot) else {
                continue;
            };
            let winning_memory_id = if *asserted == record.old_value {
                record.old_memory_id.clone()
            } else if *asserted == record.new_value {
                record.new_memory_id.clone()
            } else {
                continue;
            };
            record.status = ContradictionStatus::Resolved;
            record.resolution = Some(Resolution {
                method: ResolutionMethod::UserClarified,
                message_id: None,
                resolved_at: record.updated_at,
                winning_memory_id: Some(winning_memory_id),
            });
            resolved.push(id);
        }
        Ok(resolved)
    }

    fn get_resolved(&self, thread_id: &ThreadId) -> Result<Vec<ContradictionRecord>> {
        let Some(ids) = self.thread_order.get(thread_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|r| r.status == ContradictionStatus::Resolved)
            .cloned()
            .collect())
    }

    fn duplicate_count(&self, thread_id: &ThreadId) -> Result<usize> {
        Ok(self.duplicate_counts.get(thread_id).copied().unwrap_or(0))
    }

    fn record_duplicate(&mut self, thread_id: &ThreadId) {
        *self.duplicate_counts.entry(thread_id.clone()).or_insert(0) += 1;
    }

    #[instrument(skip(self), fields(thread_id = %thread_id))]
    fn reset_thread(&mut self, thread_id: &ThreadId) -> Result<()> {
        if let Some(ids) = self.thread_order.remove(thread_id) {
            for id in &ids {
                self.records.remove(id);
            }
        }
        self.duplicate_counts.remove(thread_id);
        Ok(())
    }
}

impl DeprecationOracle for InMemoryLedger {
    fn is_deprecated(&self, id: &MemoryId) -> bool {
        self.resolved_deprecates(id)
    }
}
