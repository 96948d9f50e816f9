//! Tone scoring — how strongly the résumé's language resembles two fixed
//! trait word lists, via sentence-embedding cosine similarity.
//!
//! Per-list score: average of the top-5 similarities against the list's trait
//! words, clamped at 0. The pair is then scaled so its sum never exceeds 1,
//! and the neutral remainder is `1 − sum`. A heuristic presentation score, not
//! business logic; the only hard guarantees are both scores in [0, 1] and
//! `collaborative + assertive ≤ 1`.
//!
//! Failure mode: no embedder, or an encode error, yields zero scores with
//! `degraded = true`. The caller surfaces a warning; the rest of the pipeline
//! proceeds.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::embedding::{cosine_similarity, Embedder};

/// Similarities averaged over at most this many best-matching trait words.
const TOP_K: usize = 5;

/// Two fixed trait word lists, loaded once and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitLexicon {
    pub collaborative: Vec<String>,
    pub assertive: Vec<String>,
}

impl Default for TraitLexicon {
    fn default() -> Self {
        Self {
            collaborative: [
                "compassionate",
                "collaborative",
                "nurturing",
                "empathetic",
                "supportive",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            assertive: ["assertive", "independent", "competitive", "strong", "logical"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Tone score pair plus the derived neutral remainder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneReport {
    pub collaborative: f32,
    pub assertive: f32,
    pub neutral: f32,
    /// True when the embedding model was unavailable and the scores are zeros.
    pub degraded: bool,
}

impl ToneReport {
    fn degraded() -> Self {
        Self {
            collaborative: 0.0,
            assertive: 0.0,
            neutral: 0.0,
            degraded: true,
        }
    }
}

/// Scores `text` against the lexicon. `embedder = None` (model never loaded)
/// and encode failures both produce the degraded zero report.
pub fn score_tone(embedder: Option<&dyn Embedder>, lexicon: &TraitLexicon, text: &str) -> ToneReport {
    let Some(embedder) = embedder else {
        return ToneReport::degraded();
    };

    match try_score(embedder, lexicon, text) {
        Ok(report) => report,
        Err(e) => {
            warn!("Tone scoring failed, returning zero scores: {e:#}");
            ToneReport::degraded()
        }
    }
}

fn try_score(
    embedder: &dyn Embedder,
    lexicon: &TraitLexicon,
    text: &str,
) -> anyhow::Result<ToneReport> {
    let text_embedding = embedder.embed(text)?;

    let collaborative = list_score(embedder, &text_embedding, &lexicon.collaborative)?;
    let assertive = list_score(embedder, &text_embedding, &lexicon.assertive)?;

    let (collaborative, assertive) = normalize_pair(collaborative, assertive);
    let neutral = (1.0 - collaborative - assertive).max(0.0);

    Ok(ToneReport {
        collaborative,
        assertive,
        neutral,
        degraded: false,
    })
}

/// Average of the top-k similarities between the text and each trait word,
/// with negative cosines clamped to 0 so the result stays in [0, 1].
fn list_score(
    embedder: &dyn Embedder,
    text_embedding: &[f32],
    words: &[String],
) -> anyhow::Result<f32> {
    if words.is_empty() {
        return Ok(0.0);
    }

    let word_embeddings = embedder.embed_batch(words)?;
    let mut sims: Vec<f32> = word_embeddings
        .iter()
        .map(|w| cosine_similarity(text_embedding, w).max(0.0))
        .collect();
    sims.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    sims.truncate(TOP_K);

    let avg = sims.iter().sum::<f32>() / sims.len() as f32;
    Ok(avg.clamp(0.0, 1.0))
}

/// Scales the pair down so the sum never exceeds 1. A zero pair stays zero.
fn normalize_pair(a: f32, b: f32) -> (f32, f32) {
    let sum = a + b;
    if sum > 1.0 {
        (a / sum, b / sum)
    } else {
        (a, b)
    }
}
