//! Caveat phrase-family detection. Semantic-minded on purpose: a single
//! regex was tried first and produced false "missing" verdicts whenever the
//! language layer paraphrased the caveat, so detection instead matches a
//! small set of phrase families.

const PHRASE_FAMILIES: &[&str] = &[
    "updated from",
    "changed from",
    "previously",
    "used to be",
    "no longer",
    "i originally had",
    "correcting my earlier",
];

/// Returns true if `text` contains a caveat phrase from any known family.
#[must_use]
pub fn has_caveat(text: &str) -> bool {
    let lower = text.to_lowercase();
    PHRASE_FAMILIES.iter().any(|p| lower.contains(p))
}

/// Builds a caveat sentence naming the superseded value, in the
/// "previously X, now Y" family (§4.7).
#[must_use]
pub fn caveat_sentence(old_value: &str, new_value: &str) -> String {
    format!(" (previously {old_value}, now {new_value})")
}

/// Builds a caveat sentence naming the superseded value. When `intense` is
/// true the phrasing is surfaced as a direct sentence rather than a
/// parenthetical aside, for threads where `enable_emotion_intensity`
/// judges the user's text carries urgency (§4.9).
#[must_use]
pub fn caveat_sentence_for(old_value: &str, new_value: &str, intense: bool) -> String {
    if intense {
        format!(" To be clear: this was previously {old_value}, and is now {new_value}.")
    } else {
        caveat_sentence(old_value, new_value)
    }
}

/// Crude lexical signal that the user's text carries emotional urgency —
/// repeated exclamation marks or an explicit urgency marker. Only ever
/// used to pick a caveat phrasing; never affects detection or gating.
#[must_use]
pub fn is_intense(user_text: &str) -> bool {
    const MARKERS: &[&str] = &["urgent", "immediately", "worried", "asap", "right now"];
    let lower = user_text.to_lowercase();
    user_text.matches('!').count() >= 2 || MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_updated_from_family() {
        assert!(has_caveat("Your employer is Acme (updated from Globex)."));
    }

    #[test]
    fn recognizes_previously_family() {
        assert!(has_caveat("You previously worked at Globex; now it's Acme."));
    }

    #[test]
    fn plain_statement_has_no_caveat() {
        assert!(!has_caveat("You work at Acme."));
    }

    #[test]
    fn sentence_builder_names_both_sides() {
        let s = caveat_sentence("Globex", "Acme");
        assert!(s.contains("Globex"));
        assert!(s.contains("Acme"));
    }

    #[test]
    fn intense_sentence_still_names_both_sides_and_still_has_a_caveat() {
        let s = caveat_sentence_for("Globex", "Acme", true);
        assert!(s.contains("Globex"));
        assert!(s.contains("Acme"));
        assert!(has_caveat(&s));
    }

    #[test]
    fn repeated_exclamations_read_as_intense() {
        assert!(is_intense("Wait, where do I work?? Tell me now!!"));
        assert!(!is_intense("Where do I work?"));
    }

    #[test]
    fn urgency_marker_reads_as_intense() {
        assert!(is_intense("I need this urgently, please."));
    }
}
