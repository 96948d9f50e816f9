//! Keyword categorizer — matches a fixed skill vocabulary against the
//! normalized token stream.
//!
//! Matching policy: whole-token exact match after lower-casing. "empathetic"
//! does not count toward "empathy". Multi-word terms ("machine learning")
//! match as a consecutive token window, so intervening punctuation is ignored
//! but word order is not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::normalize::word_frequencies;

/// Two disjoint ordered term lists, fixed at startup and read-only for the
/// process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillVocabulary {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self {
            technical: [
                "python",
                "cloud",
                "api",
                "machine learning",
                "azure",
                "aws",
                "sql",
                "docker",
                "javascript",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            soft: [
                "collaborative",
                "empathy",
                "leadership",
                "communication",
                "teamwork",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Per-term occurrence counts plus the category lists derived from them.
/// Every vocabulary term appears in `frequencies`, zeros included; the
/// category lists hold only terms seen at least once, in vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub frequencies: BTreeMap<String, u32>,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
}

/// Builds the [`KeywordReport`] for one résumé. Pure: no randomness, no
/// external calls, identical output for identical input.
pub fn categorize(tokens: &[String], vocab: &SkillVocabulary) -> KeywordReport {
    let freq = word_frequencies(tokens);

    let mut frequencies = BTreeMap::new();
    let mut technical_skills = Vec::new();
    let mut soft_skills = Vec::new();

    for term in &vocab.technical {
        let count = count_term(term, tokens, &freq);
        if count > 0 {
            technical_skills.push(term.clone());
        }
        frequencies.insert(term.clone(), count);
    }
    for term in &vocab.soft {
        let count = count_term(term, tokens, &freq);
        if count > 0 {
            soft_skills.push(term.clone());
        }
        frequencies.insert(term.clone(), count);
    }

    KeywordReport {
        frequencies,
        technical_skills,
        soft_skills,
    }
}

fn count_term(
    term: &str,
    tokens: &[String],
    freq: &std::collections::HashMap<String, u32>,
) -> u32 {
    let words: Vec<&str> = term.split_whitespace().collect();
    match words.len() {
        0 => 0,
        1 => freq.get(words[0]).copied().unwrap_or(0),
        n => count_phrase(&words, tokens, n),
    }
}

/// Counts consecutive-token occurrences of a multi-word phrase. Overlapping
/// windows all count; with real vocabularies phrases never self-overlap.
fn count_phrase(words: &[&str], tokens: &[String], n: usize) -> u32 {
    if tokens.len() < n {
        return 0;
    }
    tokens
        .windows(n)
        .filter(|w| w.iter().zip(words).all(|(t, p)| t == p))
        .count() as u32
}
