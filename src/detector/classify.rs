//! Contradiction type classification (§4.4 step 3).

use super::ContradictionType;

const CORRECTION_MARKERS: &[&str] = &["actually", "i meant", "sorry"];
const TEMPORAL_MARKERS: &[&str] = &["now", "used to", "last week", "moved", "was promoted"];

/// Returns true if `text` carries an explicit correction marker, including
/// the "not X but Y" construction.
#[must_use]
pub fn has_correction_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    CORRECTION_MARKERS.iter().any(|m| lower.contains(m)) || is_not_x_but_y(&lower)
}

fn is_not_x_but_y(lower: &str) -> bool {
    if let Some(not_pos) = lower.find("not ") {
        lower[not_pos..].contains(" but ")
    } else {
        false
    }
}

/// Returns true if `text` carries a temporal marker signaling an update
/// over time.
#[must_use]
pub fn has_temporal_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    TEMPORAL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Classifies a genuine contradiction (the DUPLICATE case — equal values
/// with a large confidence delta — is decided directly by the detector,
/// which never calls this function for it).
#[must_use]
pub fn classify_type(new_text: &str) -> ContradictionType {
    if has_correction_marker(new_text) {
        ContradictionType::Revision
    } else if has_temporal_marker(new_text) {
        ContradictionType::Temporal
    } else {
        ContradictionType::Conflict
    }
}
