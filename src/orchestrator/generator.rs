//! The external language generator seam (§6: `generate(prompt,
//! constraints) -> candidate_text`).
//!
//! The core never generates prose itself; it only asks a collaborator to,
//! and annotates what comes back. `Generator` is boxed by hand rather than
//! via an `async-trait` macro — a dyn-safe future-returning method is all
//! this crate needs, and it keeps the dependency list aligned with what the
//! rest of the core already uses.

use std::future::Future;
use std::pin::Pin;

use crate::Result;

/// Constraints the orchestrator places on a single generation call.
#[derive(Debug, Clone)]
pub struct GenerationConstraints {
    /// Maximum tokens the generator may produce.
    pub max_tokens: u32,
    /// Caveat phrases the generator must try to include, when disclosure
    /// is required for this turn (§4.7 pre-generation injection).
    pub required_caveat_phrases: Vec<String>,
    /// Deadline for the call; expiry is a refusal, not an error (§5).
    pub timeout: std::time::Duration,
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            required_caveat_phrases: Vec::new(),
            timeout: std::time::Duration::from_secs(10),
        }
    }
}

/// A future returned by [`Generator::generate`], boxed so the trait stays
/// object-safe.
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// External language generator interface. Implementers wire this to
/// whatever transport they use (HTTP call to a hosted model, local
/// inference, a scripted stub for tests).
pub trait Generator: Send + Sync {
    /// Requests a candidate response for `prompt` under `constraints`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GeneratorUnavailable`] on timeout or
    /// transport failure; callers must treat this as "no candidate", never
    /// as license to fabricate one.
    fn generate<'a>(&'a self, prompt: &'a str, constraints: &'a GenerationConstraints) -> GenerateFuture<'a>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{GenerateFuture, GenerationConstraints, Generator};

    /// A scripted generator for tests: always returns the same fixed text.
    pub struct FixedGenerator {
        pub(crate) text: String,
    }

    impl FixedGenerator {
        pub fn new(text: impl Into<String>) -> Self {
            Self { text: text.into() }
        }
    }

    impl Generator for FixedGenerator {
        fn generate<'a>(&'a self, _prompt: &'a str, _constraints: &'a GenerationConstraints) -> GenerateFuture<'a> {
            Box::pin(async move { Ok(self.text.clone()) })
        }
    }

    /// A generator that always fails, for exercising the refusal path.
    pub struct FailingGenerator;

    impl Generator for FailingGenerator {
        fn generate<'a>(&'a self, _prompt: &'a str, _constraints: &'a GenerationConstraints) -> GenerateFuture<'a> {
            Box::pin(async move { Err(crate::Error::GeneratorUnavailable("stub failure".to_string())) })
        }
    }
}
