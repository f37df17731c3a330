//! Pure extraction entry point.

use super::slots::{normalize_value, registry};
use super::{ExtractedFact, FactsBySlot, Slot};

/// Extracts typed facts from free text.
///
/// Pure function of `text`: identical input always produces identical
/// output, and extraction never raises — a slot whose pattern doesn't
/// match simply contributes nothing.
#[must_use]
pub fn extract(text: &str) -> FactsBySlot {
    let mut out: FactsBySlot = FactsBySlot::new();
    for def in registry() {
        for pat in &def.patterns {
            for caps in pat.regex.captures_iter(text) {
                let Some(raw) = caps.get(1) else { continue };
                let value = normalize_value(raw.as_str(), def.aliases);
                if value.is_empty() {
                    continue;
                }
                if let Some(whitelist) = def.whitelist {
                    if !whitelist.contains(&value.as_str()) {
                        continue;
                    }
                }
                let slot = Slot::new(def.slot);
                out.entry(slot.clone()).or_default().push(ExtractedFact {
                    slot,
                    value,
                    origin_memory_id: None,
                    pattern_id: pat.pattern_id.to_string(),
                });
            }
        }
    }
    out
}
