//! Process-wide configuration: thresholds, ranking weights, source trust
//! caps, the disclosure budget, and the feature flag registry.
//!
//! A [`Config`] is loaded once at startup from a configuration document
//! (TOML or JSON) and is immutable for the lifetime of the process; the
//! only supported reload path is an explicit restart.

mod features;

pub use features::FeatureFlags;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Detection thresholds from the configuration document (§6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// High-drift contradiction threshold (`θ_contra`).
    pub contra: f32,
    /// Minimum drift required to pair with a confidence drop (`θ_min`).
    pub min: f32,
    /// Confidence-drop threshold (`θ_drop`).
    pub drop: f32,
    /// Drift threshold applied to LLM/fallback-sourced memories (`θ_fallback`).
    pub fallback: f32,
    /// Grounding gate anchoring threshold (`θ_ground`).
    pub ground: f32,
    /// Lower bound of the paraphrase-tolerance drift band.
    pub paraphrase_low: f32,
    /// Upper bound of the paraphrase-tolerance drift band.
    pub paraphrase_high: f32,
    /// Minimum fraction of shared key elements for paraphrase tolerance.
    pub paraphrase_overlap: f32,
    /// Low-trust filter: minimum of the two trust values below which the
    /// pair is treated as noise.
    pub low_trust_floor: f32,
    /// Low-trust filter: minimum trust delta required to fire.
    pub low_trust_delta: f32,
    /// Confidence delta above which equal values are classified DUPLICATE.
    pub conf_delta: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            contra: 0.42,
            min: 0.30,
            drop: 0.30,
            fallback: 0.42,
            ground: 0.35,
            paraphrase_low: 0.25,
            paraphrase_high: 0.55,
            paraphrase_overlap: 0.70,
            low_trust_floor: 0.75,
            low_trust_delta: 0.30,
            conf_delta: 0.20,
        }
    }
}

/// Memory-store ranking weights (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Weight on cosine similarity to the query.
    pub sim: f32,
    /// Weight on stored trust.
    pub trust: f32,
    /// Weight on stored confidence.
    pub conf: f32,
    /// Weight on recency decay.
    pub recency: f32,
    /// Penalty applied when a memory is deprecated.
    pub deprecated: f32,
    /// Recency half-life, in seconds, used by the decay function.
    pub recency_half_life_secs: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            sim: 0.55,
            trust: 0.20,
            conf: 0.10,
            recency: 0.15,
            deprecated: 0.50,
            recency_half_life_secs: 14.0 * 24.0 * 3600.0,
        }
    }
}

/// Source trust caps (I2): memories whose source is `LLM_OUTPUT` or
/// `FALLBACK` may never be inserted with trust above this cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTrustCaps {
    /// Cap applied to `MemorySource::LlmOutput`.
    pub llm_output: f32,
    /// Cap applied to `MemorySource::Fallback`.
    pub fallback: f32,
}

impl Default for SourceTrustCaps {
    fn default() -> Self {
        Self {
            llm_output: 0.3,
            fallback: 0.3,
        }
    }
}

/// Maximum number of clarifying questions permitted per slot within a
/// rolling window of turns (§4.8, §6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclosureBudgetConfig {
    /// Maximum clarifying questions per slot per window.
    pub max_per_window: u32,
    /// Window size, in turns.
    pub window_turns: u32,
}

impl Default for DisclosureBudgetConfig {
    fn default() -> Self {
        Self {
            max_per_window: 1,
            window_turns: 5,
        }
    }
}

/// Process-wide, immutable-after-load configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection thresholds.
    pub thresholds: Thresholds,
    /// Ranking weights.
    pub weights: Weights,
    /// Source trust caps.
    pub trust_caps: SourceTrustCaps,
    /// Feature flag registry.
    pub flags: FeatureFlags,
    /// Disclosure budget configuration.
    pub disclosure_budget: DisclosureBudgetConfig,
    /// Number of results a retrieval call returns by default.
    pub default_retrieval_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            weights: Weights::default(),
            trust_caps: SourceTrustCaps::default(),
            flags: FeatureFlags::default(),
            disclosure_budget: DisclosureBudgetConfig::default(),
            default_retrieval_k: 8,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the document cannot be parsed.
    pub fn load_toml(document: &str) -> Result<Self> {
        toml::from_str(document)
            .map_err(|e| Error::InvalidInput(format!("invalid config document: {e}")))
    }

    /// Loads configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the document cannot be parsed.
    pub fn load_json(document: &str) -> Result<Self> {
        serde_json::from_str(document)
            .map_err(|e| Error::InvalidInput(format!("invalid config document: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let cfg = Config::default();
        assert!((cfg.thresholds.contra - 0.42).abs() < f32::EPSILON);
        assert!((cfg.thresholds.fallback - 0.42).abs() < f32::EPSILON);
        assert!((cfg.trust_caps.llm_output - 0.3).abs() < f32::EPSILON);
        assert!((cfg.trust_caps.fallback - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Config::default();
        let doc = toml::to_string(&cfg).expect("serialize");
        let parsed = Config::load_toml(&doc).expect("parse");
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn rejects_malformed_document() {
        let err = Config::load_toml("not = [valid").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
