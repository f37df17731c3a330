//! Binary entry point for groundkeep.
//!
//! This binary is a demonstration harness, not a production deployment:
//! it wires the in-memory store and ledger to a scripted echo generator
//! and runs a short canned conversation through [`Orchestrator::ingest_turn`]
//! so the turn-by-turn gate outcomes, contradiction detection, and
//! disclosure enforcement can be observed end to end.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// A demo harness legitimately prints to stdout/stderr; the governed core
// itself carries no such allowance.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use groundkeep::embedding::HashEmbedder;
use groundkeep::orchestrator::{GenerateFuture, GenerationConstraints, Generator, IngestOptions, Orchestrator};
use groundkeep::store::InMemoryStore;
use groundkeep::{Config, MemorySource, ThreadId};

/// `groundkeep-demo` — run a scripted conversation through the engine.
#[derive(Debug, Parser)]
#[command(name = "groundkeep-demo", about = "Demonstrates the groundkeep turn pipeline on a scripted conversation")]
struct Args {
    /// Thread identifier for the scripted conversation.
    #[arg(long, default_value = "demo-thread")]
    thread: String,
}

/// A generator that only ever echoes back the prompt it was given,
/// verbatim. Good enough to exercise gating and disclosure without
/// depending on a real language model.
struct EchoGenerator;

impl Generator for EchoGenerator {
    fn generate<'a>(&'a self, prompt: &'a str, _constraints: &'a GenerationConstraints) -> GenerateFuture<'a> {
        Box::pin(async move { Ok(echo_answer(prompt)) })
    }
}

/// Turns the prompt's "Known context" block into a plausible-looking
/// answer; falls back to a plain acknowledgement when there is none.
fn echo_answer(prompt: &str) -> String {
    if let Some(context) = prompt.split("Known context:\n").nth(1) {
        if let Some(line) = context.lines().find(|l| l.starts_with("- ")) {
            return line.trim_start_matches("- ").trim_end_matches('.').to_string() + ".";
        }
    }
    "Got it, noted.".to_string()
}

#[tokio::main]
async fn main() {
    groundkeep::observability::init_tracing();
    let args = Args::parse();
    let thread = ThreadId::new(args.thread);

    let orchestrator = Orchestrator::new(
        Box::new(InMemoryStore::new()),
        Box::new(groundkeep::ledger::InMemoryLedger::new()),
        HashEmbedder::default(),
        EchoGenerator,
        Config::default(),
    );

    let script: &[(&str, MemorySource)] = &[
        ("My favorite color is blue.", MemorySource::User),
        ("What is my favorite color?", MemorySource::User),
        ("Actually my favorite color is green now.", MemorySource::User),
        ("What is my favorite color?", MemorySource::User),
    ];

    for (turn, (text, source)) in script.iter().enumerate() {
        let options = IngestOptions {
            turn: turn as u64,
            source: *source,
            ..IngestOptions::default()
        };
        match orchestrator.ingest_turn(thread.clone(), text, options).await {
            Ok(report) => {
                println!("> {text}");
                println!("  gate: {:?}  response_type: {:?}", report.gate_outcome, report.response_type);
                println!("  emitted: {}", report.emitted_text);
                if !report.contradictions_new.is_empty() {
                    println!("  new contradictions: {}", report.contradictions_new.len());
                }
                println!();
            }
            Err(e) => eprintln!("turn rejected: {e}"),
        }
    }
}
