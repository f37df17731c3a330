//! An in-process `MemoryBackend`: a thread-scoped, insertion-ordered
//! store. Intended for tests and for embedding groundkeep in a process
//! that owns its own persistence (the durable-storage file-locking layer
//! is an explicit non-goal of the core).

use std::collections::HashMap;

use tracing::instrument;

use crate::embedding::drift;
use crate::facts::{self, Slot};
use crate::ids::{MemoryId, ThreadId};
use crate::{Error, Result};

use super::backend::{DeprecationOracle, MemoryBackend, RetrievalOptions};
use super::ranking::{self, RankedMemory};
use super::{Memory, ScoredMemory};

/// A simple in-memory implementation of [`MemoryBackend`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    memories: HashMap<MemoryId, Memory>,
    thread_order: HashMap<ThreadId, Vec<MemoryId>>,
    slot_index: HashMap<(ThreadId, Slot), Vec<MemoryId>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index_slots(&mut self, memory: &Memory) {
        let extracted = facts::extract(&memory.text);
        for slot in extracted.keys() {
            self.slot_index
                .entry((memory.thread_id.clone(), slot.clone()))
                .or_default()
                .push(memory.id.clone());
        }
    }
}

impl MemoryBackend for InMemoryStore {
    #[instrument(skip(self, memory), fields(thread_id = %memory.thread_id))]
    fn insert(&mut self, memory: Memory) -> Result<MemoryId> {
        let id = memory.id.clone();
        self.thread_order
            .entry(memory.thread_id.clone())
            .or_default()
            .push(id.clone());
        self.index_slots(&memory);
        self.memories.insert(id.clone(), memory);
        Ok(id)
    }

    fn get(&self, id: &MemoryId) -> Result<Option<Memory>> {
        Ok(self.memories.get(id).cloned())
    }

    fn get_by_slot(&self, thread_id: &ThreadId, slot: &Slot) -> Result<Vec<Memory>> {
        let mut out: Vec<Memory> = self
            .slot_index
            .get(&(thread_id.clone(), slot.clone()))
            .into_iter()
            .flatten()
            .filter_map(|id| self.memories.get(id))
            .filter(|m| m.active)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.as_str().cmp(a.id.as_str()))
        });
        Ok(out)
    }

    #[instrument(skip(self, new_memory))]
    fn supersede(&mut self, old_id: &MemoryId, mut new_memory: Memory) -> Result<MemoryId> {
        if !self.memories.contains_key(old_id) {
            return Err(Error::InvalidInput(format!(
                "cannot supersede unknown memory {old_id}"
            )));
        }
        new_memory.supersedes = Some(old_id.clone());
        self.insert(new_memory)
    }

    fn soft_delete(&mut self, id: &MemoryId) -> Result<()> {
        match self.memories.get_mut(id) {
            Some(m) => {
                m.active = false;
                Ok(())
            }
            None => Err(Error::InvalidInput(format!("unknown memory {id}"))),
        }
    }

    #[instrument(skip(self, query_vector, deprecation), fields(thread_id = %thread_id))]
    fn retrieve(
        &self,
        thread_id: &ThreadId,
        query_vector: &[f32],
        opts: &RetrievalOptions,
        deprecation: &dyn DeprecationOracle,
    ) -> Result<Vec<ScoredMemory>> {
        let Some(ids) = self.thread_order.get(thread_id) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<RankedMemory> = Vec::new();
        for id in ids {
            let Some(memory) = self.memories.get(id) else {
                continue;
            };
            if !memory.active || memory.trust < opts.min_trust {
                continue;
            }
            let deprecated = deprecation.is_deprecated(id);
            if opts.exclude_deprecated && deprecated {
                continue;
            }
            let sim = 1.0 - drift(query_vector, &memory.vector);
            let elapsed = opts.now.saturating_sub(memory.updated_at) as f64;
            let s = ranking::score(
                sim,
                memory.trust,
                memory.confidence,
                elapsed,
                deprecated,
                &opts.weights,
            );
            ranked.push(RankedMemory {
                memory: memory.clone(),
                score: s,
            });
        }
        ranked.sort_unstable_by(|a, b| b.cmp(a));
        ranked.truncate(opts.k);
        Ok(ranked.into_iter().map(|r| (r.memory, r.score)).collect())
    }

    #[instrument(skip(self), fields(thread_id = %thread_id))]
    fn reset_thread(&mut self, thread_id: &ThreadId) -> Result<()> {
        if let Some(ids) = self.thread_order.remove(thread_id) {
            for id in &ids {
                self.memories.remove(id);
            }
        }
        self.slot_index.retain(|(t, _), _| t != thread_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SourceTrustCaps, Weights};
    use crate::store::MemorySource;

    fn mem(id: &str, thread: &str, text: &str, trust: f32, updated_at: u64, vector: Vec<f32>) -> Memory {
        let (m, _) = Memory::new(
            MemoryId::new(id),
            ThreadId::new(thread),
            text,
            vector,
            "hashing-v1",
            MemorySource::User,
            trust,
            0.8,
            updated_at,
            &SourceTrustCaps::default(),
        );
        m
    }

    #[test]
    fn insert_then_retrieve_sees_the_insert() {
        let mut store = InMemoryStore::new();
        let thread = ThreadId::new("t1");
        let m = mem("m1", "t1", "my favorite color is blue", 0.9, 10, vec![1.0, 0.0]);
        store.insert(m).expect("insert");

        let opts = RetrievalOptions::new(10, 0.0, true, Weights::default(), 10);
        let results = store
            .retrieve(&thread, &[1.0, 0.0], &opts, &super::super::backend::NoDeprecation)
            .expect("retrieve");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, MemoryId::new("m1"));
    }

    #[test]
    fn retrieval_is_thread_scoped() {
        let mut store = InMemoryStore::new();
        store
            .insert(mem("m1", "t1", "a fact", 0.9, 10, vec![1.0, 0.0]))
            .expect("insert");
        store
            .insert(mem("m2", "t2", "a fact", 0.9, 10, vec![1.0, 0.0]))
            .expect("insert");

        let opts = RetrievalOptions::new(10, 0.0, true, Weights::default(), 10);
        let results = store
            .retrieve(&ThreadId::new("t1"), &[1.0, 0.0], &opts, &super::super::backend::NoDeprecation)
            .expect("retrieve");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, MemoryId::new("m1"));
    }

    #[test]
    fn min_trust_filters_low_trust_candidates() {
        let mut store = InMemoryStore::new();
        store
            .insert(mem("m1", "t1", "a fact", 0.2, 10, vec![1.0, 0.0]))
            .expect("insert");
        let opts = RetrievalOptions::new(10, 0.5, true, Weights::default(), 10);
        let results = store
            .retrieve(&ThreadId::new("t1"), &[1.0, 0.0], &opts, &super::super::backend::NoDeprecation)
            .expect("retrieve");
        assert!(results.is_empty());
    }

    #[test]
    fn get_by_slot_is_latest_first() {
        let mut store = InMemoryStore::new();
        store
            .insert(mem("m1", "t1", "my favorite color is blue", 0.9, 10, vec![1.0]))
            .expect("insert");
        store
            .insert(mem("m2", "t1", "my favorite color is green", 0.9, 20, vec![1.0]))
            .expect("insert");
        let results = store
            .get_by_slot(&ThreadId::new("t1"), &Slot::new("favorite_color"))
            .expect("get_by_slot");
        assert_eq!(results[0].id, MemoryId::new("m2"));
        assert_eq!(results[1].id, MemoryId::new("m1"));
    }

    #[test]
    fn soft_delete_removes_memory_from_retrieval_but_not_the_ledger_view() {
        let mut store = InMemoryStore::new();
        store
            .insert(mem("m1", "t1", "a fact", 0.9, 10, vec![1.0]))
            .expect("insert");
        store.soft_delete(&MemoryId::new("m1")).expect("soft_delete");
        assert!(!store.get(&MemoryId::new("m1")).expect("get").expect("present").active);
    }

    #[test]
    fn supersede_links_without_destroying_the_original() {
        let mut store = InMemoryStore::new();
        store
            .insert(mem("m1", "t1", "a fact", 0.9, 10, vec![1.0]))
            .expect("insert");
        let new_mem = mem("m2", "t1", "a better fact", 0.9, 20, vec![1.0]);
        store.supersede(&MemoryId::new("m1"), new_mem).expect("supersede");

        assert!(store.get(&MemoryId::new("m1")).expect("get").is_some());
        let superseder = store.get(&MemoryId::new("m2")).expect("get").expect("present");
        assert_eq!(superseder.supersedes, Some(MemoryId::new("m1")));
    }

    #[test]
    fn exclude_deprecated_filters_results() {
        struct AlwaysDeprecated;
        impl DeprecationOracle for AlwaysDeprecated {
            fn is_deprecated(&self, _id: &MemoryId) -> bool {
                true
            }
        }
        let mut store = InMemoryStore::new();
        store
            .insert(mem("m1", "t1", "a fact", 0.9, 10, vec![1.0]))
            .expect("insert");
        let opts = RetrievalOptions::new(10, 0.0, true, Weights::default(), 10);
        let results = store
            .retrieve(&ThreadId::new("t1"), &[1.0], &opts, &AlwaysDeprecated)
            .expect("retrieve");
        assert!(results.is_empty());
    }

    #[test]
    fn reset_thread_drops_only_that_threads_memories() {
        let mut store = InMemoryStore::new();
        store
            .insert(mem("m1", "t1", "a fact", 0.9, 10, vec![1.0]))
            .expect("insert");
        store
            .insert(mem("m2", "t2", "a fact", 0.9, 10, vec![1.0]))
            .expect("insert");
        store.reset_thread(&ThreadId::new("t1")).expect("reset");
        assert!(store.get(&MemoryId::new("m1")).expect("get").is_none());
        assert!(store.get(&MemoryId::new("m2")).expect("get").is_some());
    }
}
