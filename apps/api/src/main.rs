mod analysis;
mod config;
mod embedding;
mod errors;
mod extract;
mod market;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::keywords::SkillVocabulary;
use crate::analysis::pipeline::PipelineOptions;
use crate::analysis::tone::TraitLexicon;
use crate::config::Config;
use crate::embedding::{model::OnnxEmbedder, Embedder};
use crate::market::aggregate::AggregatorOptions;
use crate::market::client::{AdzunaClient, JobSearch};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_directive(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Sentence encoder: optional. A missing or broken model degrades tone
    // scoring to zeros instead of refusing to start.
    let embedder = build_embedder(&config);

    // Job-search API client
    let job_search: Arc<dyn JobSearch> = Arc::new(AdzunaClient::new(
        config.adzuna_base_url.clone(),
        config.adzuna_country.clone(),
        config.adzuna_app_id.clone(),
        config.adzuna_app_key.clone(),
    ));
    info!("Adzuna client initialized (country: {})", config.adzuna_country);

    // Build app state
    let state = AppState {
        config: config.clone(),
        embedder,
        job_search,
        vocabulary: Arc::new(SkillVocabulary::default()),
        lexicon: Arc::new(TraitLexicon::default()),
        pipeline_options: PipelineOptions::default(),
        aggregator_options: AggregatorOptions::default(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Default filter directive when `RUST_LOG` is unset. Event targets carry the
/// bin crate name (`api`), not the package name, so the directive must too.
fn default_log_directive(rust_log: &str) -> String {
    let crate_root = module_path!().split("::").next().unwrap_or("api");
    format!("{crate_root}={rust_log}")
}

fn build_embedder(config: &Config) -> Option<Arc<dyn Embedder>> {
    let dir = config.embedding_model_dir.as_deref()?;
    match OnnxEmbedder::load(Path::new(dir)) {
        Ok(model) => {
            info!("Tone scoring enabled (embedding dim: {})", model.dimensions());
            Some(Arc::new(model))
        }
        Err(e) => {
            warn!("Embedding model failed to load, tone scoring degraded: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_log_directive_targets_bin_crate() {
        // The bin target is named "api"; a directive built from the package
        // name would match nothing.
        assert_eq!(default_log_directive("info"), "api=info");
        assert_eq!(default_log_directive("debug"), "api=debug");
    }

    #[test]
    fn test_default_filter_enables_app_info_events() {
        let filter = EnvFilter::new(default_log_directive("info"));
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            assert!(
                tracing::event_enabled!(target: "api::analysis::handlers", Level::INFO),
                "default directive must enable application INFO events"
            );
            assert!(
                !tracing::event_enabled!(target: "api::analysis::handlers", Level::DEBUG),
                "default directive stays at info level"
            );
        });
    }
}
