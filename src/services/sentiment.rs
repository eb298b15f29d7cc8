use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{SENTIMENT_NEGATIVE_THRESHOLD, SENTIMENT_POSITIVE_THRESHOLD};

/// Three-way sentiment label for descriptive company text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Word valences on a [-1, 1] scale. Small on purpose: company summaries
/// lean on a narrow promotional/cautionary vocabulary.
const LEXICON: &[(&str, f64)] = &[
    ("advanced", 0.4),
    ("award", 0.6),
    ("bankrupt", -0.9),
    ("bankruptcy", -0.9),
    ("best", 0.8),
    ("breakthrough", 0.7),
    ("decline", -0.5),
    ("declining", -0.5),
    ("default", -0.7),
    ("deficit", -0.6),
    ("delisted", -0.8),
    ("efficient", 0.5),
    ("excellent", 0.9),
    ("expand", 0.4),
    ("expanding", 0.4),
    ("fail", -0.7),
    ("failed", -0.7),
    ("failure", -0.7),
    ("fraud", -0.9),
    ("gain", 0.5),
    ("gains", 0.5),
    ("growing", 0.5),
    ("growth", 0.5),
    ("impairment", -0.6),
    ("improve", 0.5),
    ("improved", 0.5),
    ("innovative", 0.6),
    ("lawsuit", -0.6),
    ("leader", 0.6),
    ("leading", 0.6),
    ("litigation", -0.5),
    ("loss", -0.6),
    ("losses", -0.6),
    ("opportunity", 0.5),
    ("outperform", 0.7),
    ("popular", 0.5),
    ("premier", 0.6),
    ("profit", 0.6),
    ("profitable", 0.7),
    ("quality", 0.4),
    ("recall", -0.5),
    ("reliable", 0.5),
    ("restructuring", -0.4),
    ("risk", -0.3),
    ("risks", -0.3),
    ("robust", 0.5),
    ("strong", 0.6),
    ("success", 0.7),
    ("successful", 0.7),
    ("trusted", 0.6),
    ("uncertain", -0.4),
    ("uncertainty", -0.4),
    ("weak", -0.5),
    ("weakness", -0.5),
    ("winning", 0.6),
];

/// Tokens that invert the valence of the word that follows them
const NEGATIONS: &[&str] = &["no", "not", "never", "without"];

fn word_valence(word: &str) -> Option<f64> {
    LEXICON
        .binary_search_by(|probe| probe.0.cmp(word))
        .ok()
        .map(|idx| LEXICON[idx].1)
}

/// Score text polarity on [-1, 1]: the mean valence of recognized words,
/// with single-token negation flipping the following word. Text with no
/// recognized words scores 0.
pub fn polarity(text: &str) -> f64 {
    let mut total = 0.0;
    let mut scored = 0usize;
    let mut negated = false;

    for raw_token in text.split(|c: char| !c.is_ascii_alphanumeric() && c != '\'') {
        if raw_token.is_empty() {
            continue;
        }
        let token = raw_token.to_ascii_lowercase();
        let token = token.trim_matches('\'');

        if NEGATIONS.contains(&token) || token.ends_with("n't") {
            negated = true;
            continue;
        }

        if let Some(valence) = word_valence(token) {
            total += if negated { -valence } else { valence };
            scored += 1;
        }
        negated = false;
    }

    if scored == 0 {
        0.0
    } else {
        total / scored as f64
    }
}

/// Label a polarity score with the three-way threshold rule
pub fn classify_polarity(polarity: f64) -> Sentiment {
    if polarity > SENTIMENT_POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if polarity < SENTIMENT_NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Classify a piece of text; empty or absent text is Neutral
pub fn classify(text: Option<&str>) -> Sentiment {
    match text {
        Some(text) if !text.trim().is_empty() => classify_polarity(polarity(text)),
        _ => Sentiment::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_is_sorted_for_binary_search() {
        for pair in LEXICON.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(classify_polarity(0.11), Sentiment::Positive);
        assert_eq!(classify_polarity(0.1), Sentiment::Neutral);
        assert_eq!(classify_polarity(0.0), Sentiment::Neutral);
        assert_eq!(classify_polarity(-0.1), Sentiment::Neutral);
        assert_eq!(classify_polarity(-0.11), Sentiment::Negative);
    }

    #[test]
    fn test_empty_text_is_neutral() {
        assert_eq!(classify(None), Sentiment::Neutral);
        assert_eq!(classify(Some("")), Sentiment::Neutral);
        assert_eq!(classify(Some("   ")), Sentiment::Neutral);
    }

    #[test]
    fn test_unrecognized_text_is_neutral() {
        assert_eq!(polarity("the quarterly report was filed on time"), 0.0);
        assert_eq!(
            classify(Some("the quarterly report was filed on time")),
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_positive_and_negative_text() {
        assert_eq!(
            classify(Some("a leading innovative company with strong growth")),
            Sentiment::Positive
        );
        assert_eq!(
            classify(Some("facing lawsuits, declining sales and heavy losses")),
            Sentiment::Negative
        );
    }

    #[test]
    fn test_negation_flips_valence() {
        assert!(polarity("strong results") > 0.0);
        assert!(polarity("not strong results") < 0.0);
    }

    #[test]
    fn test_polarity_stays_in_range() {
        let text = "excellent excellent excellent fraud fraud fraud";
        let score = polarity(text);
        assert!((-1.0..=1.0).contains(&score));
    }
}
