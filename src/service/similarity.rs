use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use indexmap::IndexSet;

/// Lower-cased, de-duplicated word set in first-seen order
pub fn tokenize(text: &str) -> IndexSet<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

/// Jaccard similarity of the two word sets; 0 if either side is blank
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let left = tokenize(a);
    let right = tokenize(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let intersection = left.iter().filter(|w| right.contains(*w)).count();
    let union = left.len() + right.len() - intersection;
    intersection as f64 / union as f64
}

/// `max(0, 1 - |reference - candidate| / |reference|)`
///
/// A zero reference only matches a zero candidate.
pub fn numeric_proximity(reference: &BigDecimal, candidate: &BigDecimal) -> f64 {
    let diff = (reference - candidate).abs();
    if reference.is_zero() {
        return if diff.is_zero() { 1.0 } else { 0.0 };
    }

    let ratio = (&diff / &reference.abs()).to_f64().unwrap_or(f64::INFINITY);
    (1.0 - ratio).max(0.0)
}

/// Scores are compared against fixed cut-offs; four decimals keeps the
/// comparison stable across summation order.
pub fn round_score(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// 1.0 when both codes are present and equal
pub fn item_code_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(x), Some(y)) if x == y => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn identical_descriptions_score_one() {
        assert_eq!(text_similarity("Steel Bolt M8", "steel bolt m8"), 1.0);
    }

    #[test]
    fn partial_overlap_is_jaccard() {
        // {steel, bolt, m8} vs {steel, bolt, m10} -> 2 / 4
        assert_eq!(text_similarity("steel bolt m8", "steel bolt m10"), 0.5);
    }

    #[test]
    fn blank_description_scores_zero() {
        assert_eq!(text_similarity("", "steel bolt"), 0.0);
        assert_eq!(text_similarity("steel bolt", "   "), 0.0);
    }

    #[test]
    fn repeated_words_count_once() {
        assert_eq!(tokenize("Box box BOX of nails").len(), 3);
    }

    #[test]
    fn proximity_scales_with_relative_difference() {
        assert_eq!(numeric_proximity(&dec("100"), &dec("100")), 1.0);
        assert!((numeric_proximity(&dec("100"), &dec("95")) - 0.95).abs() < 1e-9);
        assert_eq!(numeric_proximity(&dec("100"), &dec("250")), 0.0);
    }

    #[test]
    fn proximity_guards_zero_reference() {
        assert_eq!(numeric_proximity(&dec("0"), &dec("0")), 1.0);
        assert_eq!(numeric_proximity(&dec("0"), &dec("5")), 0.0);
    }

    #[test]
    fn rounding_settles_float_drift() {
        let drifted = 0.4 + 0.3 + 0.2;
        assert_eq!(round_score(drifted), 0.9);
        assert_eq!(round_score((2.7_f64) / 3.0), 0.9);
    }

    #[test]
    fn item_codes_need_both_sides() {
        assert_eq!(item_code_match(Some("A-1"), Some("A-1")), 1.0);
        assert_eq!(item_code_match(Some("A-1"), Some("A-2")), 0.0);
        assert_eq!(item_code_match(None, Some("A-1")), 0.0);
        assert_eq!(item_code_match(None, None), 0.0);
    }
}
