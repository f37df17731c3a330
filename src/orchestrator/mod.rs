//! Orchestrator (C10): the strictly-sequential, per-thread turn pipeline
//! that ties every other component together (§4.10).
//!
//! A turn never interleaves with another turn on the same thread: a
//! logical per-thread lock is held for the pipeline's duration, and the
//! only suspension points inside it are the embedder call, the external
//! generator call, and store/ledger access (§5). Any hard failure along
//! the way (storage unavailable, generator unavailable) produces a
//! refusal report rather than propagating — the core never fabricates a
//! response to cover for an internal error.

mod generator;
mod report;

pub use generator::{GenerateFuture, GenerationConstraints, Generator};
pub use report::TurnReport;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use crate::clarify::{self, FailureReason};
use crate::config::Config;
use crate::detector::{self, Candidate, DetectorInput, PriorFact, Verdict};
use crate::disclosure::{self, CaveatOutcome, DisclosureBudget};
use crate::embedding::Embedder;
use crate::facts::{self, FactsBySlot, Slot};
use crate::gates::{self, GateInput, GateOutcome};
use crate::ids::{ContradictionId, MemoryId, ThreadId};
use crate::ledger::{ContradictionRecord, ContradictionStatus, LedgerHandle, Resolution, ResolutionMethod};
use crate::store::{DeprecationOracle, Memory, MemoryBackend, MemorySource, RetrievalOptions};
use crate::{Error, Result};

/// What a `reset_thread` call should discard (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    /// Drop only the memory store's records for this thread.
    Memory,
    /// Drop only the ledger's records for this thread.
    Ledger,
    /// Drop both.
    All,
}

/// Per-call options for [`Orchestrator::ingest_turn`].
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Monotonically increasing turn counter for this thread, used by the
    /// disclosure budget's rolling window.
    pub turn: u64,
    /// Whether this turn's user text should be stored as a new memory.
    pub store_new_info: bool,
    /// Provenance to record the new memory under, when stored.
    pub source: MemorySource,
    /// Requested trust for the new memory (subject to the I2 cap).
    pub trust: f32,
    /// Requested confidence for the new memory.
    pub confidence: f32,
    /// Maximum memories to retrieve.
    pub k: usize,
    /// Minimum trust a retrieved memory must have.
    pub min_trust: f32,
    /// Calibration-only hint passed through to the gates (§4.6).
    pub calibration_known_correct: Option<bool>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            turn: 0,
            store_new_info: true,
            source: MemorySource::User,
            trust: 0.9,
            confidence: 0.9,
            k: 8,
            min_trust: 0.0,
            calibration_known_correct: None,
        }
    }
}

/// Ties the embedder, generator, memory store, and contradiction ledger
/// together behind one per-thread-serialized entry point.
pub struct Orchestrator<E, G> {
    store: Mutex<Box<dyn MemoryBackend>>,
    ledger: Mutex<Box<dyn LedgerHandle>>,
    embedder: E,
    generator: G,
    config: Config,
    thread_locks: Mutex<HashMap<ThreadId, Arc<Mutex<()>>>>,
    disclosure_budget: Mutex<DisclosureBudget>,
}

impl<E: Embedder, G: Generator> Orchestrator<E, G> {
    /// Builds an orchestrator from its collaborators.
    pub fn new(
        store: Box<dyn MemoryBackend>,
        ledger: Box<dyn LedgerHandle>,
        embedder: E,
        generator: G,
        config: Config,
    ) -> Self {
        let disclosure_budget = DisclosureBudget::new(config.disclosure_budget);
        Self {
            store: Mutex::new(store),
            ledger: Mutex::new(ledger),
            embedder,
            generator,
            config,
            thread_locks: Mutex::new(HashMap::new()),
            disclosure_budget: Mutex::new(disclosure_budget),
        }
    }

    async fn thread_lock(&self, thread_id: &ThreadId) -> Arc<Mutex<()>> {
        let mut locks = self.thread_locks.lock().await;
        locks.entry(thread_id.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Runs the full turn pipeline (§4.10) for one piece of user text.
    ///
    /// # Errors
    ///
    /// Only ever returns [`Error::InvalidInput`] for malformed arguments;
    /// every internal failure (storage, embedder, generator) is converted
    /// into a refusal [`TurnReport`] instead of propagating, per the
    /// error-handling design (§7).
    #[instrument(skip(self, user_text, options), fields(thread_id = %thread_id))]
    pub async fn ingest_turn(&self, thread_id: ThreadId, user_text: &str, options: IngestOptions) -> Result<TurnReport> {
        if user_text.trim().is_empty() {
            return Err(Error::InvalidInput("user_text must not be empty".to_string()));
        }

        let lock = self.thread_lock(&thread_id).await;
        let _guard = lock.lock().await;

        let new_facts = facts::extract(user_text);
        let new_facts_top = top_values(&new_facts);

        if self.config.flags.enable_contradiction_lifecycle {
            let mut ledger = self.ledger.lock().await;
            if let Err(e) = ledger.resolve_from_assertion(&thread_id, &new_facts_top) {
                return Ok(refusal_report(&format!("ledger unavailable: {e}")));
            }
        }

        let query_vector = match self.embedder.embed(user_text) {
            Ok(v) => v,
            Err(e) => return Ok(refusal_report(&format!("embedder unavailable: {e}"))),
        };

        let now = crate::current_timestamp();
        let retrieve_opts = RetrievalOptions::new(options.k, options.min_trust, true, self.config.weights, now);
        let retrieved = {
            let store = self.store.lock().await;
            let ledger = self.ledger.lock().await;
            let deprecation: &dyn DeprecationOracle = &**ledger;
            match store.retrieve(&thread_id, &query_vector, &retrieve_opts, deprecation) {
                Ok(r) => r,
                Err(e) => return Ok(refusal_report(&format!("storage unavailable: {e}"))),
            }
        };
        let retrieved_memories: Vec<Memory> = retrieved.iter().map(|(m, _)| m.clone()).collect();

        let mut new_memory_id = None;
        if options.store_new_info {
            let (memory, clamped) = Memory::new(
                MemoryId::generate(),
                thread_id.clone(),
                user_text,
                query_vector.clone(),
                self.embedder.model_id(),
                options.source,
                options.trust,
                options.confidence,
                now,
                &self.config.trust_caps,
            );
            if clamped {
                tracing::warn!(thread_id = %thread_id, "trust clamped at insertion per I2");
            }
            let mut store = self.store.lock().await;
            match store.insert(memory) {
                Ok(id) => new_memory_id = Some(id),
                Err(e) => return Ok(refusal_report(&format!("storage unavailable: {e}"))),
            }
        }

        let needed_slots: HashSet<Slot> = new_facts.keys().cloned().collect();
        let priors = build_priors(&retrieved_memories, &needed_slots);

        let mut candidates = HashMap::new();
        let candidate_trust = capped_trust(options.source, options.trust, &self.config.trust_caps);
        for (slot, facts) in &new_facts {
            let Some(fact) = facts.first() else { continue };
            candidates.insert(
                slot.clone(),
                Candidate {
                    value: fact.value.clone(),
                    vector: query_vector.clone(),
                    trust: candidate_trust,
                    confidence: options.confidence,
                    source: options.source,
                },
            );
        }

        let detector_input = DetectorInput {
            new_text: user_text,
            candidates,
            priors,
            thresholds: self.config.thresholds,
            paraphrase_tolerance_enabled: self.config.flags.enable_paraphrase_tolerance,
        };

        let mut contradictions_new = Vec::new();
        let mut first_new_contradiction: Option<(Slot, ContradictionRecord)> = None;
        if self.config.flags.enable_contradiction_detection {
            let verdicts = detector::detect(&detector_input);
            let mut ledger = self.ledger.lock().await;
            for verdict in verdicts {
                match verdict {
                    Verdict::Contradiction {
                        slot,
                        old_memory_id,
                        old_value,
                        new_value,
                        contradiction_type,
                        drift,
                        trust_old,
                        trust_new,
                        conf_old,
                        conf_new,
                    } => {
                        let Some(new_id) = &new_memory_id else { continue };
                        let record = ContradictionRecord {
                            id: ContradictionId::generate(),
                            thread_id: thread_id.clone(),
                            slot: slot.clone(),
                            old_memory_id,
                            new_memory_id: new_id.clone(),
                            old_value,
                            new_value,
                            contradiction_type,
                            status: ContradictionStatus::Open,
                            drift,
                            trust_old,
                            trust_new,
                            conf_old,
                            conf_new,
                            detected_at: now,
                            updated_at: now,
                            resolution: None,
                        };
                        if let Ok(id) = ledger.record(record.clone()) {
                            contradictions_new.push(id);
                            if first_new_contradiction.is_none() {
                                first_new_contradiction = Some((slot, record));
                            }
                        }
                    }
                    Verdict::Duplicate { .. } => {
                        ledger.record_duplicate(&thread_id);
                    }
                    Verdict::Suppressed { slot, reason } => {
                        tracing::debug!(?slot, ?reason, "contradiction suppressed");
                    }
                }
            }
        }

        let open_records = {
            let ledger = self.ledger.lock().await;
            ledger.find_open(&thread_id).unwrap_or_default()
        };
        let contradictions_active: Vec<ContradictionId> = open_records.iter().map(|r| r.id.clone()).collect();
        let disclosures = if self.config.flags.enable_disclosure_policy {
            disclosure::required_disclosures(&retrieved_memories, &open_records)
        } else {
            Vec::new()
        };
        let caveat_required = !disclosures.is_empty();
        let intense = self.config.flags.enable_emotion_intensity && disclosure::is_intense(user_text);

        let prompt = build_prompt(user_text, &retrieved_memories, caveat_required, self.config.flags.enable_retrieval_first_prompt);
        let constraints = GenerationConstraints {
            required_caveat_phrases: disclosures
                .iter()
                .map(|d| format!("previously {}, now {}", d.old_value, d.new_value))
                .collect(),
            ..GenerationConstraints::default()
        };

        let generated = tokio::time::timeout(constraints.timeout, self.generator.generate(&prompt, &constraints)).await;
        let mut candidate_text = match generated {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Ok(refusal_report(&format!("generator unavailable: {e}"))),
            Err(_elapsed) => return Ok(refusal_report("generator timed out")),
        };

        let mut caveat_outcome = disclosure::verify(&candidate_text, caveat_required);
        if caveat_outcome == CaveatOutcome::MissingNeeded && self.config.flags.enable_caveat_injection {
            candidate_text = disclosure::inject(&candidate_text, &disclosures, intense);
            caveat_outcome = disclosure::verify(&candidate_text, caveat_required);
        }
        let caveat_present = disclosure::has_caveat(&candidate_text);

        let candidate_facts = facts::extract(&candidate_text);
        let candidate_vector = match self.embedder.embed(&candidate_text) {
            Ok(v) => v,
            Err(e) => return Ok(refusal_report(&format!("embedder unavailable: {e}"))),
        };

        let gate_input = GateInput {
            user_text,
            candidate_output: &candidate_text,
            candidate_vector: &candidate_vector,
            retrieved: &retrieved_memories,
            candidate_facts: &candidate_facts,
            has_open_contradiction: caveat_required,
            thresholds: &self.config.thresholds,
            calibration_known_correct: options.calibration_known_correct,
            flags: self.config.flags,
        };
        let (gate_outcome, response_type, scores) = gates::gate(&gate_input);

        let mut clarifying_question = None;
        let mut emitted_text = match gate_outcome {
            GateOutcome::PassGrounded | GateOutcome::PassUngrounded => candidate_text.clone(),
            GateOutcome::RejectNoMemory => {
                if self.config.flags.enable_self_questioning {
                    let mut budget = self.disclosure_budget.lock().await;
                    clarifying_question = clarify::question(&FailureReason::MemoryMiss, options.turn, &mut budget);
                }
                clarifying_question.clone().unwrap_or_else(default_refusal)
            }
            GateOutcome::RejectCorrect | GateOutcome::RejectIncorrect => {
                if self.config.flags.enable_self_questioning {
                    let mut budget = self.disclosure_budget.lock().await;
                    let reason = if let Some((slot, record)) = &first_new_contradiction {
                        FailureReason::Contradiction { slot, record }
                    } else if scores.intent < 0.5 {
                        FailureReason::IntentMismatch
                    } else {
                        FailureReason::Grounding
                    };
                    clarifying_question = clarify::question(&reason, options.turn, &mut budget);
                }
                clarifying_question.clone().unwrap_or_else(default_refusal)
            }
        };

        // §7: a caveat that was required but never landed is never silently
        // dropped. If re-injection is off (or somehow still missing), fall
        // back to a clarifying question naming the open contradiction
        // instead of emitting undisclosed text.
        if caveat_outcome == CaveatOutcome::MissingNeeded && clarifying_question.is_none() {
            if self.config.flags.enable_self_questioning {
                if let Some(&record) = disclosures.first() {
                    let mut budget = self.disclosure_budget.lock().await;
                    let reason = FailureReason::Contradiction {
                        slot: &record.slot,
                        record,
                    };
                    clarifying_question = clarify::question(&reason, options.turn, &mut budget);
                }
            }
            emitted_text = clarifying_question.clone().unwrap_or_else(default_refusal);
        } else if self.config.flags.enable_humble_wrapper
            && matches!(gate_outcome, GateOutcome::PassGrounded)
            && matches!(response_type, crate::gates::ResponseType::Factual)
            && scores.composite < self.config.thresholds.ground
        {
            emitted_text = humble_wrap(&emitted_text);
        }

        Ok(TurnReport {
            emitted_text,
            grounded: matches!(gate_outcome, GateOutcome::PassGrounded),
            gate_outcome,
            response_type,
            scores,
            contradictions_new,
            contradictions_active,
            caveat_required,
            caveat_present,
            caveat_outcome,
            clarifying_question,
            retrieved_memory_ids: retrieved_memories.iter().map(|m| m.id.clone()).collect(),
        })
    }

    /// Destructive reset of a thread's state (§6). Intended for test
    /// harnesses; holds the per-thread lock for the duration so it can
    /// never interleave with an in-flight turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store or ledger fails to reset.
    pub async fn reset_thread(&self, thread_id: &ThreadId, target: ResetTarget) -> Result<()> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        if matches!(target, ResetTarget::Memory | ResetTarget::All) {
            let mut store = self.store.lock().await;
            store.reset_thread(thread_id)?;
        }
        if matches!(target, ResetTarget::Ledger | ResetTarget::All) {
            let mut ledger = self.ledger.lock().await;
            ledger.reset_thread(thread_id)?;
        }
        Ok(())
    }

    /// Explicit resolution event (§6, §4.5): the collaborator (chat
    /// front-end, operator tool) tells the core a contradiction has been
    /// settled. The core never resolves a contradiction on its own
    /// initiative — this is the only path that moves a record out of
    /// `OPEN` for reasons other than [`ingest_turn`]'s own
    /// `resolve_from_assertion` pass.
    ///
    /// `winning_side` selects which of the record's two values survives;
    /// pass `None` only when `method` is
    /// [`ResolutionMethod::KeptBoth`](crate::ledger::ResolutionMethod::KeptBoth),
    /// in which case the record transitions to `ACCEPTED` instead of
    /// `RESOLVED` and both sides remain active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the contradiction id is unknown
    /// or already `RESOLVED`, or if the underlying ledger fails.
    pub async fn resolve_contradiction(
        &self,
        thread_id: &ThreadId,
        contradiction_id: &ContradictionId,
        method: ResolutionMethod,
        winning_side: Option<MemoryId>,
    ) -> Result<()> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        let now = crate::current_timestamp();
        let (new_status, winning_memory_id) = match method {
            ResolutionMethod::KeptBoth => (ContradictionStatus::Accepted, None),
            ResolutionMethod::UserClarified | ResolutionMethod::Replaced => {
                let Some(winner) = winning_side else {
                    return Err(Error::InvalidInput(
                        "winning_side is required unless method is KeptBoth".to_string(),
                    ));
                };
                (ContradictionStatus::Resolved, Some(winner))
            }
        };

        let resolution = Resolution {
            method,
            message_id: None,
            resolved_at: now,
            winning_memory_id,
        };

        let mut ledger = self.ledger.lock().await;
        ledger.update_status(contradiction_id, new_status, Some(resolution))
    }
}

fn top_values(facts: &FactsBySlot) -> HashMap<Slot, String> {
    facts
        .iter()
        .filter_map(|(slot, values)| values.first().map(|f| (slot.clone(), f.value.clone())))
        .collect()
}

fn capped_trust(source: MemorySource, trust: f32, caps: &crate::config::SourceTrustCaps) -> f32 {
    if !source.is_trust_capped() {
        return trust;
    }
    let cap = match source {
        MemorySource::LlmOutput => caps.llm_output,
        MemorySource::Fallback => caps.fallback,
        _ => return trust,
    };
    trust.min(cap)
}

fn build_priors(retrieved: &[Memory], needed: &HashSet<Slot>) -> HashMap<Slot, PriorFact> {
    let mut priors = HashMap::new();
    for memory in retrieved {
        if priors.len() == needed.len() {
            break;
        }
        let facts = facts::extract(&memory.text);
        for slot in needed {
            if priors.contains_key(slot) {
                continue;
            }
            if let Some(values) = facts.get(slot) {
                if let Some(fact) = values.first() {
                    priors.insert(
                        slot.clone(),
                        PriorFact {
                            memory_id: memory.id.clone(),
                            value: fact.value.clone(),
                            text: memory.text.clone(),
                            vector: memory.vector.clone(),
                            trust: memory.trust,
                            confidence: memory.confidence,
                        },
                    );
                }
            }
        }
    }
    priors
}

fn build_prompt(user_text: &str, retrieved: &[Memory], caveat_required: bool, retrieval_first: bool) -> String {
    let mut context = String::new();
    if !retrieved.is_empty() {
        context.push_str("\n\nKnown context:\n");
        for memory in retrieved {
            context.push_str("- ");
            context.push_str(&memory.text);
            context.push('\n');
        }
    }

    let mut prompt = String::new();
    if retrieval_first && !context.is_empty() {
        prompt.push_str(context.trim_start());
        prompt.push_str("\n\nUser said: ");
        prompt.push_str(user_text);
    } else {
        prompt.push_str("User said: ");
        prompt.push_str(user_text);
        prompt.push_str(&context);
    }

    if caveat_required {
        prompt.push_str("\nNote: a prior value on this topic was superseded; disclose the change.\n");
    }
    prompt
}

/// Prefixes a hedge onto a low-confidence factual response, per
/// `enable_humble_wrapper` (§4.9). Never applied twice.
fn humble_wrap(text: &str) -> String {
    const HEDGES: &[&str] = &["i believe", "i think", "as far as i know"];
    let lower = text.to_lowercase();
    if HEDGES.iter().any(|h| lower.starts_with(h)) {
        return text.to_string();
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("I believe {}{}", first.to_lowercase(), chars.as_str()),
        None => text.to_string(),
    }
}

fn refusal_report(reason: &str) -> TurnReport {
    TurnReport {
        emitted_text: default_refusal(),
        grounded: false,
        gate_outcome: GateOutcome::RejectNoMemory,
        response_type: crate::gates::ResponseType::Refusal,
        scores: crate::gates::GateScores {
            intent: 0.0,
            memory: 0.0,
            grounding: 0.0,
            composite: 0.0,
        },
        contradictions_new: Vec::new(),
        contradictions_active: Vec::new(),
        caveat_required: false,
        caveat_present: false,
        caveat_outcome: CaveatOutcome::AbsentCorrect,
        clarifying_question: None,
        retrieved_memory_ids: Vec::new(),
    }
    .with_reason(reason)
}

impl TurnReport {
    fn with_reason(mut self, reason: &str) -> Self {
        self.emitted_text = format!("{} ({reason})", self.emitted_text);
        self
    }
}

fn default_refusal() -> String {
    "I'm not able to answer that right now.".to_string()
}
