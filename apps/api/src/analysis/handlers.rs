//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::analysis::pipeline::{analyze_resume, AnalysisReport, PipelineOptions};
use crate::errors::AppError;
use crate::extract::{extract_text, DocumentKind};
use crate::market::aggregate::MarketAggregator;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub resume_text: String,
    /// Overrides the default city list when present and non-empty.
    #[serde(default)]
    pub cities: Vec<String>,
}

/// POST /api/v1/resumes/analyze
///
/// Multipart upload: required `file` field (.pdf or .docx), optional repeated
/// `city` text fields overriding the default city list. Validation problems
/// are 400, unreadable documents 422; everything past extraction degrades
/// into report warnings instead of failing.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut file_bytes: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut cities: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                filename = field.file_name().map(String::from);
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?,
                );
            }
            Some("city") => {
                let city = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read city field: {e}")))?;
                if !city.trim().is_empty() {
                    cities.push(city.trim().to_string());
                }
            }
            _ => {}
        }
    }

    let bytes =
        file_bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    let filename =
        filename.ok_or_else(|| AppError::Validation("No file name provided".to_string()))?;
    let kind = DocumentKind::from_filename(&filename).ok_or_else(|| {
        AppError::Validation("Only .pdf and .docx files are supported".to_string())
    })?;

    info!("Processing upload: {filename}");

    // PDF/DOCX parsing is CPU-bound; keep it off the async workers.
    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::DocumentParse(e.to_string()))?;

    let report = run_pipeline(&state, &text, cities).await;
    info!("Analyzed resume {filename}: {} warnings", report.warnings.len());
    Ok(Json(report))
}

/// POST /api/v1/resumes/analyze-text
///
/// Same pipeline over pre-extracted text, for callers that parse documents
/// themselves.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let report = run_pipeline(&state, &request.resume_text, request.cities).await;
    Ok(Json(report))
}

async fn run_pipeline(state: &AppState, text: &str, cities: Vec<String>) -> AnalysisReport {
    let options = if cities.is_empty() {
        state.pipeline_options.clone()
    } else {
        PipelineOptions {
            cities,
            ..state.pipeline_options.clone()
        }
    };

    let aggregator =
        MarketAggregator::new(state.job_search.clone(), state.aggregator_options.clone());

    analyze_resume(
        text,
        &state.vocabulary,
        &state.lexicon,
        state.embedder.as_deref(),
        &aggregator,
        &options,
    )
    .await
}
