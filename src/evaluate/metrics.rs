//! Answer quality metrics.
//!
//! Token-overlap F1, normalized exact match and length ratio between a
//! produced answer and a reference answer, plus mean aggregation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Anything that is not a letter, number, underscore or whitespace.
///
/// Written out instead of `\w`, which also admits combining marks and
/// leaves out fraction and superscript digits.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("Invalid regex"));

/// Scores for one prediction/reference pair.
///
/// `exact_match` is 1.0 or 0.0 so that it averages like the other fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub f1: f64,
    pub exact_match: f64,
    pub length_ratio: f64,
}

/// Mean of each metric over a set of scored answers.
pub type Summary = MetricScores;

/// Lowercase, replace punctuation with spaces and collapse whitespace.
///
/// Accepts `None` so that a missing answer normalizes to the empty string.
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };

    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(lowered.trim(), " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize then split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// F1 over the sets of unique tokens.
///
/// Two empty inputs score 0.0, not 1.0.
pub fn token_f1(prediction: &str, reference: &str) -> f64 {
    let pred_tokens = tokenize(prediction);
    let ref_tokens = tokenize(reference);

    if pred_tokens.is_empty() || ref_tokens.is_empty() {
        return 0.0;
    }

    let pred_set: HashSet<&str> = pred_tokens.iter().map(String::as_str).collect();
    let ref_set: HashSet<&str> = ref_tokens.iter().map(String::as_str).collect();
    let overlap = pred_set.intersection(&ref_set).count();

    if overlap == 0 {
        return 0.0;
    }

    let precision = overlap as f64 / pred_set.len() as f64;
    let recall = overlap as f64 / ref_set.len() as f64;
    if precision + recall == 0.0 {
        return 0.0;
    }

    2.0 * precision * recall / (precision + recall)
}

/// Strict equality of the normalized forms.
pub fn exact_match(prediction: &str, reference: &str) -> bool {
    normalize(prediction) == normalize(reference)
}

/// Prediction token count over reference token count; 0.0 for an empty reference.
pub fn length_ratio(prediction: &str, reference: &str) -> f64 {
    let ref_len = tokenize(reference).len();
    if ref_len == 0 {
        return 0.0;
    }
    tokenize(prediction).len() as f64 / ref_len as f64
}

/// Compute all metrics for a single prediction/reference pair.
pub fn evaluate_pair(prediction: &str, reference: &str) -> MetricScores {
    MetricScores {
        f1: token_f1(prediction, reference),
        exact_match: if exact_match(prediction, reference) { 1.0 } else { 0.0 },
        length_ratio: length_ratio(prediction, reference),
    }
}

/// Arithmetic mean of each metric. An empty input yields all zeros.
pub fn summarize<'a, I>(scores: I) -> Summary
where
    I: IntoIterator<Item = &'a MetricScores>,
{
    let mut total = MetricScores::default();
    let mut count = 0usize;

    for s in scores {
        total.f1 += s.f1;
        total.exact_match += s.exact_match;
        total.length_ratio += s.length_ratio;
        count += 1;
    }

    if count == 0 {
        return Summary::default();
    }

    let n = count as f64;
    Summary {
        f1: total.f1 / n,
        exact_match: total.exact_match / n,
        length_ratio: total.length_ratio / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Mixture - IDLE CUTOFF,  Fuel OFF! "), "mixture idle cutoff fuel off");
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("RMK AO2"), "rmk ao2");
    }

    #[test]
    fn test_normalize_unicode_word_characters() {
        assert_eq!(normalize("1½ miles"), "1½ miles");
        assert_eq!(normalize("cafe\u{301}"), "cafe");
        assert_eq!(normalize("Bl\u{e9}riot XI, 1909"), "bl\u{e9}riot xi 1909");
        assert_eq!(normalize("FL_350"), "fl_350");
    }

    #[test]
    fn test_normalize_idempotent() {
        for text in ["Engine FIRE!!", "  a\t\tb\nc ", "OVC003 -> 300ft AGL", "", "Cabin Heat/Air - OFF"] {
            let once = normalize(text);
            assert_eq!(normalize(once.as_str()), once);
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Va decreases; with weight."), vec!["va", "decreases", "with", "weight"]);
        assert!(tokenize("  !!  ").is_empty());
    }

    #[test]
    fn test_token_f1_empty_inputs() {
        assert_eq!(token_f1("", "anything"), 0.0);
        assert_eq!(token_f1("anything", ""), 0.0);
        assert_eq!(token_f1("", ""), 0.0);
        assert_eq!(token_f1("...", "?!"), 0.0);
    }

    #[test]
    fn test_token_f1_symmetric() {
        let pairs = [
            ("stall speed increases with bank", "the steeper the bank the higher the stall speed"),
            ("Don oxygen masks", "don masks, descend"),
            ("a b c", "d e f"),
        ];
        for (p, r) in pairs {
            assert!((token_f1(p, r) - token_f1(r, p)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_token_f1_uses_unique_tokens() {
        // "the the the" has a single unique token
        assert!((token_f1("the the the", "the") - 1.0).abs() < 1e-12);
        // precision 1/2, recall 1/1
        assert!((token_f1("fuel off", "fuel") - (2.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_exact_match() {
        assert!(exact_match("Engine FIRE!!", "engine fire"));
        assert!(!exact_match("engine fire procedure", "engine fire"));
        assert!(exact_match("", "  "));
    }

    #[test]
    fn test_length_ratio() {
        assert_eq!(length_ratio("anything at all", ""), 0.0);
        assert_eq!(length_ratio("", ""), 0.0);
        assert!((length_ratio("one two three", "one two") - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_pair_checklist() {
        let m = evaluate_pair(
            "Mixture idle cutoff fuel off",
            "Mixture - IDLE CUTOFF, Fuel Selector - OFF",
        );
        assert!(m.f1 > 0.3);
        assert_eq!(m.exact_match, 0.0);
        assert!((m.length_ratio - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarize() {
        let empty: Vec<MetricScores> = Vec::new();
        assert_eq!(summarize(&empty), Summary { f1: 0.0, exact_match: 0.0, length_ratio: 0.0 });

        let scores = [
            MetricScores { f1: 1.0, exact_match: 1.0, length_ratio: 1.0 },
            MetricScores { f1: 0.5, exact_match: 0.0, length_ratio: 2.0 },
        ];
        let s = summarize(&scores);
        assert!((s.f1 - 0.75).abs() < 1e-12);
        assert!((s.exact_match - 0.5).abs() < 1e-12);
        assert!((s.length_ratio - 1.5).abs() < 1e-12);
    }
}
