use std::sync::Arc;

use crate::analysis::keywords::SkillVocabulary;
use crate::analysis::pipeline::PipelineOptions;
use crate::analysis::tone::TraitLexicon;
use crate::config::Config;
use crate::embedding::Embedder;
use crate::market::aggregate::AggregatorOptions;
use crate::market::client::JobSearch;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The embedder and the word lists are loaded once at startup and read-only
/// for the process lifetime; everything a request computes is owned by that
/// request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when the embedding model failed to load — tone scoring degrades
    /// to zeros instead of failing requests.
    pub embedder: Option<Arc<dyn Embedder>>,
    pub job_search: Arc<dyn JobSearch>,
    pub vocabulary: Arc<SkillVocabulary>,
    pub lexicon: Arc<TraitLexicon>,
    pub pipeline_options: PipelineOptions,
    pub aggregator_options: AggregatorOptions,
}
