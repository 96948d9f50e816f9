//! The one analysis pipeline: normalize → categorize → tone → market.
//!
//! Earlier revisions of this product wired the same four building blocks
//! together several times with slightly different knobs; those knobs now live
//! in [`PipelineOptions`] and the wiring exists exactly once. All state is
//! owned by the in-flight request — nothing is cached across calls.

use serde::{Deserialize, Serialize};

use crate::analysis::keywords::{categorize, KeywordReport, SkillVocabulary};
use crate::analysis::normalize::tokenize;
use crate::analysis::tone::{score_tone, ToneReport, TraitLexicon};
use crate::embedding::Embedder;
use crate::market::aggregate::{MarketAggregator, MarketSnapshot};

/// Presentational knobs the front-end revisions used to disagree on.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Detected skills actually sent to the job-search API, in category order.
    pub max_market_skills: usize,
    pub cities: Vec<String>,
    /// Character cap on the echoed text preview.
    pub preview_chars: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_market_skills: 3,
            cities: [
                "New York",
                "San Francisco",
                "Chicago",
                "Austin",
                "Seattle",
                "Denver",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            preview_chars: 1000,
        }
    }
}

/// Everything one upload produces, assembled for the JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub text_preview: String,
    pub keywords: KeywordReport,
    pub tone: ToneReport,
    pub market: Vec<MarketSnapshot>,
    /// Degradations the caller should surface (model unavailable, partial
    /// market data). Never fatal.
    pub warnings: Vec<String>,
}

/// Runs the full analysis over already-extracted résumé text.
pub async fn analyze_resume(
    text: &str,
    vocab: &SkillVocabulary,
    lexicon: &TraitLexicon,
    embedder: Option<&dyn Embedder>,
    aggregator: &MarketAggregator,
    options: &PipelineOptions,
) -> AnalysisReport {
    let tokens = tokenize(text);
    let keywords = categorize(&tokens, vocab);

    let tone = score_tone(embedder, lexicon, text);

    let market_skills: Vec<String> = keywords
        .technical_skills
        .iter()
        .chain(keywords.soft_skills.iter())
        .take(options.max_market_skills)
        .cloned()
        .collect();
    let market = aggregator.analyze(&market_skills, &options.cities).await;

    let mut warnings = Vec::new();
    if tone.degraded {
        warnings.push("Tone scoring unavailable: embedding model not loaded".to_string());
    }
    for snapshot in market.iter().filter(|s| s.partial) {
        warnings.push(format!(
            "Job market data incomplete for \"{}\"",
            snapshot.skill
        ));
    }

    AnalysisReport {
        text_preview: preview(text, options.preview_chars),
        keywords,
        tone,
        market,
        warnings,
    }
}

/// First `max_chars` characters on a char boundary.
fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::aggregate::AggregatorOptions;
    use crate::market::client::{JobSearch, MarketError, SearchPage, SearchQuery};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptySearch;

    #[async_trait]
    impl JobSearch for EmptySearch {
        async fn search(&self, _query: &SearchQuery) -> Result<SearchPage, MarketError> {
            Ok(SearchPage::default())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl JobSearch for FailingSearch {
        async fn search(&self, _query: &SearchQuery) -> Result<SearchPage, MarketError> {
            Err(MarketError::Api {
                status: 503,
                message: "down".to_string(),
            })
        }
    }

    struct UnitEmbedder;

    impl Embedder for UnitEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.8, 0.6]).collect())
        }
    }

    fn aggregator(api: Arc<dyn JobSearch>) -> MarketAggregator {
        MarketAggregator::new(api, AggregatorOptions::default())
    }

    fn small_options() -> PipelineOptions {
        PipelineOptions {
            max_market_skills: 2,
            cities: vec![],
            preview_chars: 50,
        }
    }

    #[tokio::test]
    async fn test_full_report_over_plain_text() {
        let agg = aggregator(Arc::new(EmptySearch));
        let report = analyze_resume(
            "A collaborative python engineer with aws experience",
            &SkillVocabulary::default(),
            &TraitLexicon::default(),
            Some(&UnitEmbedder),
            &agg,
            &small_options(),
        )
        .await;

        assert_eq!(report.keywords.technical_skills, vec!["python", "aws"]);
        assert_eq!(report.keywords.soft_skills, vec!["collaborative"]);
        // Market capped at 2 skills, category order.
        assert_eq!(report.market.len(), 2);
        assert_eq!(report.market[0].skill, "python");
        assert_eq!(report.market[1].skill, "aws");
        assert!(!report.tone.degraded);
        assert!(report.tone.collaborative + report.tone.assertive <= 1.0 + f32::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_embedder_warns_but_completes() {
        let agg = aggregator(Arc::new(EmptySearch));
        let report = analyze_resume(
            "python developer",
            &SkillVocabulary::default(),
            &TraitLexicon::default(),
            None,
            &agg,
            &small_options(),
        )
        .await;

        assert!(report.tone.degraded);
        assert_eq!(report.tone.collaborative, 0.0);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("embedding model")));
        // Keyword and market sections still produced.
        assert_eq!(report.keywords.technical_skills, vec!["python"]);
        assert_eq!(report.market.len(), 1);
    }

    #[tokio::test]
    async fn test_api_failure_warns_per_skill_without_aborting() {
        let agg = aggregator(Arc::new(FailingSearch));
        let report = analyze_resume(
            "python and aws",
            &SkillVocabulary::default(),
            &TraitLexicon::default(),
            None,
            &agg,
            &small_options(),
        )
        .await;

        assert_eq!(report.market.len(), 2);
        assert!(report.market.iter().all(|s| s.partial));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("python")));
    }

    #[tokio::test]
    async fn test_empty_text_yields_empty_report_sections() {
        let agg = aggregator(Arc::new(EmptySearch));
        let report = analyze_resume(
            "",
            &SkillVocabulary::default(),
            &TraitLexicon::default(),
            None,
            &agg,
            &small_options(),
        )
        .await;

        assert!(report.keywords.technical_skills.is_empty());
        assert!(report.keywords.soft_skills.is_empty());
        assert!(report.market.is_empty());
        assert!(report.text_preview.is_empty());
    }

    #[tokio::test]
    async fn test_preview_is_capped() {
        let agg = aggregator(Arc::new(EmptySearch));
        let long_text = "x".repeat(500);
        let report = analyze_resume(
            &long_text,
            &SkillVocabulary::default(),
            &TraitLexicon::default(),
            None,
            &agg,
            &small_options(),
        )
        .await;
        assert_eq!(report.text_preview.len(), 50);
    }
}
