//! Text normalization — lower-cased word tokens and a frequency table.
//!
//! Tokenization splits on non-word-character boundaries; no stemming or
//! lemmatization. The same token stream feeds both the frequency report and
//! the keyword categorizer, so exact string match after lower-casing is the
//! only matching mechanism in play.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Lower-cases `text` and returns its word tokens in document order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Occurrence count per lower-cased token. Empty input yields an empty map.
pub fn word_frequencies(tokens: &[String]) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = tokenize("Python, API-development; AWS!");
        assert_eq!(tokens, vec!["python", "api", "development", "aws"]);
    }

    #[test]
    fn test_empty_input_yields_empty_mapping() {
        let tokens = tokenize("");
        assert!(tokens.is_empty());
        assert!(word_frequencies(&tokens).is_empty());
    }

    #[test]
    fn test_counts_sum_to_token_count() {
        let tokens = tokenize("a b a c a b ... !!");
        let freq = word_frequencies(&tokens);
        let total: u32 = freq.values().sum();
        assert_eq!(total as usize, tokens.len());
        assert!(freq.values().all(|&c| c > 0), "no zero or negative counts");
        assert_eq!(freq["a"], 3);
        assert_eq!(freq["b"], 2);
        assert_eq!(freq["c"], 1);
    }

    #[test]
    fn test_whitespace_only_input_is_empty() {
        assert!(tokenize("  \n\t  ").is_empty());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let text = "Collaborative engineer skilled in python and aws";
        let a = word_frequencies(&tokenize(text));
        let b = word_frequencies(&tokenize(text));
        assert_eq!(a, b);
    }
}
