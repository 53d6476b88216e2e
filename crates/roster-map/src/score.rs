//! Name similarity scoring.
//!
//! [`score`] is the generic header-to-field similarity: exact normalized
//! equality scores 100, containment scores proportionally up to 70, anything
//! else scores 0. Content heuristics in the engine build on top of it.
//!
//! [`entity_score`] additionally considers normalized Levenshtein similarity
//! so that near-identical organisation names (a missing letter, an
//! abbreviated suffix) land in the high and medium resolution tiers.

use rapidfuzz::distance::levenshtein;
use roster_model::normalize_label;

/// Upper bound for a containment match.
pub const CONTAINMENT_WEIGHT: f64 = 70.0;

/// Similarity of two labels in `0..=100`.
pub fn score(a: &str, b: &str) -> u8 {
    let a = normalize_label(a);
    let b = normalize_label(b);
    normalized_score(&a, &b)
}

/// Similarity used for entity resolution in `0..=100`.
///
/// The larger of [`score`] and the rounded normalized Levenshtein similarity.
pub fn entity_score(a: &str, b: &str) -> u8 {
    let a = normalize_label(a);
    let b = normalize_label(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let edit = levenshtein::normalized_similarity(a.chars(), b.chars());
    normalized_score(&a, &b).max(to_percent(edit))
}

fn normalized_score(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (shorter, longer, short_len, long_len) = if a_len <= b_len {
        (a, b, a_len, b_len)
    } else {
        (b, a, b_len, a_len)
    };
    if longer.contains(shorter) {
        let ratio = short_len as f64 / long_len as f64;
        (ratio * CONTAINMENT_WEIGHT).round() as u8
    } else {
        0
    }
}

fn to_percent(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_after_normalization_scores_100() {
        assert_eq!(score("First Name", "first_name"), 100);
        assert_eq!(score("E-MAIL", "email"), 100);
    }

    #[test]
    fn containment_is_proportional() {
        assert_eq!(score("Mobile", "mobile_phone"), 38);
        assert_eq!(score("Phone", "mobile_phone"), 32);
        assert_eq!(score("mobile_phone", "Mobile"), 38);
    }

    #[test]
    fn unrelated_and_empty_score_zero() {
        assert_eq!(score("Shoe Size", "surname"), 0);
        assert_eq!(score("", "surname"), 0);
        assert_eq!(score("--", "--"), 0);
    }

    #[test]
    fn entity_score_uses_edit_distance() {
        assert_eq!(entity_score("Acme Pty Lt", "Acme Pty Ltd"), 90);
        assert_eq!(entity_score("Acme Pty Ltd", "Acme Pty Limited"), 71);
        assert_eq!(entity_score("Acme", "Acme Pty Ltd"), 40);
        assert_eq!(entity_score("ACME PTY LTD", "acme pty ltd"), 100);
    }
}
