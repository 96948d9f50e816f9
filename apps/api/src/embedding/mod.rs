//! Sentence embedding seam — the tone scorer only ever sees this trait.
//!
//! The production backend is an ONNX MiniLM-class encoder (`model.rs`). Tests
//! substitute deterministic stubs. Carried in `AppState` as
//! `Option<Arc<dyn Embedder>>`: `None` means the model failed to load and the
//! pipeline degrades to zero tone scores instead of crashing.

pub mod model;

use anyhow::Result;

/// Fixed-length sentence encoder. Implementations must be deterministic for
/// identical input text.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Cosine similarity between two vectors. Returns 0.0 when either vector has
/// zero norm or the lengths differ, so callers never divide by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
