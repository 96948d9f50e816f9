pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Uploads above this size are rejected before any processing.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes/analyze",
            post(handlers::handle_analyze_upload),
        )
        .route(
            "/api/v1/resumes/analyze-text",
            post(handlers::handle_analyze_text),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
