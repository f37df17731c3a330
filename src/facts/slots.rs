//! The closed slot registry: match patterns, whitelists, and normalizers.
//!
//! Patterns run case-insensitively and are deliberately narrow — a slot
//! with no whitelist leans on surrounding lexical context ("works at",
//! "language is") instead of bare noun matching, so that extraction stays
//! high-precision.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing temporal filler that free-form entity captures must stop
/// before, so "Microsoft Corp these days" doesn't absorb "these days"
/// into the captured entity value. Shared by every slot whose pattern
/// captures an open-ended entity name up to punctuation or end-of-text.
const ENTITY_TERMINATOR: &str = r"(?:\s+(?:these days|right now|now|anymore|currently)\b|[.,;]|$)";

/// Programming languages recognized by language-typed slots
/// (`first_language`, `favorite_language`, `programming_language`).
pub const PROGRAMMING_LANGUAGES: &[&str] = &[
    "rust",
    "python",
    "java",
    "javascript",
    "typescript",
    "go",
    "c++",
    "c#",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "scala",
    "elixir",
    "haskell",
    "clojure",
    "f#",
    "zig",
];

/// A single compiled extraction pattern.
pub struct SlotPattern {
    /// Identifier recorded on any fact this pattern produces.
    pub pattern_id: &'static str,
    /// Compiled regex with the value in capture group 1.
    pub regex: Regex,
}

/// Definition of a single closed-set slot.
pub struct SlotDef {
    /// The slot name.
    pub slot: &'static str,
    /// Patterns tried in order; the first match wins per occurrence.
    pub patterns: Vec<SlotPattern>,
    /// Optional value whitelist. When present, a match whose normalized
    /// value is not in the whitelist is discarded rather than emitted.
    pub whitelist: Option<&'static [&'static str]>,
    /// Alias collapses applied after lowercasing/trimming
    /// (e.g. `"microsoft corp" -> "microsoft"`).
    pub aliases: &'static [(&'static str, &'static str)],
}

fn pattern(pattern_id: &'static str, re: &str) -> SlotPattern {
    SlotPattern {
        pattern_id,
        regex: Regex::new(re).unwrap_or_else(|e| {
            panic!("invalid slot pattern `{pattern_id}`: {e}");
        }),
    }
}

/// Returns the closed slot registry.
pub fn registry() -> &'static [SlotDef] {
    static REGISTRY: Lazy<Vec<SlotDef>> = Lazy::new(build_registry);
    &REGISTRY
}

fn build_registry() -> Vec<SlotDef> {
    vec![
        SlotDef {
            slot: "employer",
            patterns: vec![
                pattern(
                    "employer_work_at",
                    &format!(r"(?i)\bi work (?:at|for) ([a-z0-9&.,' -]+?){ENTITY_TERMINATOR}"),
                ),
                pattern(
                    "employer_employed_by",
                    &format!(r"(?i)\bemployed by ([a-z0-9&.,' -]+?){ENTITY_TERMINATOR}"),
                ),
            ],
            whitelist: None,
            aliases: &[
                ("microsoft corp", "microsoft"),
                ("microsoft corporation", "microsoft"),
                ("amazon.com", "amazon"),
                ("google inc", "google"),
                ("google llc", "google"),
            ],
        },
        SlotDef {
            slot: "location",
            patterns: vec![
                pattern(
                    "location_live_in",
                    &format!(r"(?i)\b(?:i live in|based in|located in|moved to) ([a-z .'-]+?){ENTITY_TERMINATOR}"),
                ),
                pattern(
                    "location_team",
                    r"(?i)\bswitched to the ([a-z]+) team\b",
                ),
            ],
            whitelist: None,
            aliases: &[],
        },
        SlotDef {
            slot: "title",
            patterns: vec![
                pattern(
                    "title_explicit",
                    &format!(r"(?i)\bmy (?:title|role) is ([a-z0-9 /+-]+?){ENTITY_TERMINATOR}"),
                ),
            ],
            whitelist: None,
            aliases: &[],
        },
        SlotDef {
            slot: "first_language",
            patterns: vec![
                pattern(
                    "first_language_started_with",
                    r"(?i)\bstart(?:ed|ing)? (?:coding |programming )?with ([a-z0-9+#]+)\b",
                ),
                pattern(
                    "first_language_explicit",
                    r"(?i)\bmy first (?:programming )?language (?:was|is) ([a-z0-9+#]+)\b",
                ),
            ],
            whitelist: Some(PROGRAMMING_LANGUAGES),
            aliases: &[],
        },
        SlotDef {
            slot: "favorite_language",
            patterns: vec![
                pattern(
                    "favorite_language_explicit",
                    r"(?i)\bfavou?rite (?:programming )?language is ([a-z0-9+#]+)\b",
                ),
                pattern(
                    "favorite_language_colon",
                    r"(?i)\bfavou?rite language:? ([a-z0-9+#]+)\b",
                ),
            ],
            whitelist: Some(PROGRAMMING_LANGUAGES),
            aliases: &[],
        },
        SlotDef {
            slot: "programming_language",
            patterns: vec![
                pattern(
                    "programming_language_use_as",
                    r"(?i)\bi (?:use|code in) ([a-z0-9+#]+) as my (?:main )?programming language\b",
                ),
                pattern(
                    "programming_language_of_choice",
                    r"(?i)\bprogramming language of choice is ([a-z0-9+#]+)\b",
                ),
            ],
            whitelist: Some(PROGRAMMING_LANGUAGES),
            aliases: &[],
        },
        SlotDef {
            slot: "age_years",
            patterns: vec![pattern(
                "age_years_explicit",
                r"(?i)\bi(?:'m| am) (\d{1,3}) years? old\b",
            )],
            whitelist: None,
            aliases: &[],
        },
        SlotDef {
            slot: "programming_years",
            patterns: vec![
                pattern(
                    "programming_years_for",
                    r"(?i)\bprogramming for (\d{1,2}) years?\b",
                ),
                pattern(
                    "programming_years_of_experience",
                    r"(?i)\b(\d{1,2}) years? of (?:programming|coding) experience\b",
                ),
            ],
            whitelist: None,
            aliases: &[],
        },
        SlotDef {
            slot: "masters_school",
            patterns: vec![pattern(
                "masters_school_explicit",
                &format!(r"(?i)\bmaster'?s (?:degree )?(?:from|at) ([a-z0-9 .'-]+?){ENTITY_TERMINATOR}"),
            )],
            whitelist: None,
            aliases: &[],
        },
        SlotDef {
            slot: "favorite_color",
            patterns: vec![pattern(
                "favorite_color_explicit",
                r"(?i)\bfavou?rite colou?r is ([a-z]+)\b",
            )],
            whitelist: None,
            aliases: &[],
        },
    ]
}

/// Normalizes a raw captured value: lowercase, trim, collapse internal
/// whitespace, then apply the slot's alias table.
#[must_use]
pub fn normalize_value(raw: &str, aliases: &[(&str, &str)]) -> String {
    let lowered = raw.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim().trim_end_matches(['.', ',', ';']).to_string();
    for (from, to) in aliases {
        if trimmed == *from {
            return (*to).to_string();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_and_case() {
        assert_eq!(normalize_value("  Microsoft   Corp ", &[]), "microsoft corp");
    }

    #[test]
    fn applies_alias_collapse() {
        let aliases = &[("microsoft corp", "microsoft")];
        assert_eq!(normalize_value("Microsoft Corp", aliases), "microsoft");
    }

    #[test]
    fn registry_has_every_spec_example_slot() {
        let names: Vec<&str> = registry().iter().map(|d| d.slot).collect();
        for expected in [
            "employer",
            "location",
            "title",
            "first_language",
            "favorite_language",
            "age_years",
            "programming_years",
            "masters_school",
        ] {
            assert!(names.contains(&expected), "missing slot {expected}");
        }
    }
}
