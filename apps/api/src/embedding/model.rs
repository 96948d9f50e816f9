//! ONNX sentence encoder backend for the [`Embedder`] trait.
//!
//! Expects a directory holding `model.onnx` and `tokenizer.json` (a MiniLM-class
//! sentence-transformer export). Pooling is mask-weighted mean over the last
//! hidden state followed by L2 normalization, so cosine similarities downstream
//! land in [-1, 1].

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use ort::{inputs, GraphOptimizationLevel, Session};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::Embedder;

const MAX_LENGTH: usize = 512;

pub struct OnnxEmbedder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
}

impl OnnxEmbedder {
    /// Loads the session and tokenizer from `dir`. Called once at startup;
    /// the caller decides whether a failure is fatal.
    pub fn load(dir: &Path) -> Result<Self> {
        let model_file = dir.join("model.onnx");
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_file)
            .with_context(|| format!("Failed to load ONNX model from {model_file:?}"))?;

        let tokenizer_file = dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_file)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer from {tokenizer_file:?}: {e}"))?;

        let dim = session
            .outputs
            .first()
            .and_then(|o| o.output_type.tensor_dimensions())
            .and_then(|dims| dims.last().copied())
            .unwrap_or(384) as usize;

        info!("Sentence encoder loaded from {dir:?} (dim={dim})");

        Ok(Self {
            session,
            tokenizer,
            dim,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dim
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!("Embedding batch of {} texts", texts.len());

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {e}"))?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_LENGTH);

        let mut input_ids = vec![0i64; batch_size * max_len];
        let mut attention_mask = vec![0i64; batch_size * max_len];
        let mut token_type_ids = vec![0i64; batch_size * max_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let type_ids = encoding.get_type_ids();

            let len = ids.len().min(max_len);
            for j in 0..len {
                input_ids[i * max_len + j] = ids[j] as i64;
                attention_mask[i * max_len + j] = mask[j] as i64;
                token_type_ids[i * max_len + j] = type_ids[j] as i64;
            }
        }

        let input_ids = Array2::from_shape_vec((batch_size, max_len), input_ids)?;
        let attention = Array2::from_shape_vec((batch_size, max_len), attention_mask.clone())?;
        let token_type_ids = Array2::from_shape_vec((batch_size, max_len), token_type_ids)?;

        let outputs = self.session.run(inputs![
            "input_ids" => input_ids.view(),
            "attention_mask" => attention.view(),
            "token_type_ids" => token_type_ids.view(),
        ]?)?;

        let output = outputs
            .get("last_hidden_state")
            .or_else(|| outputs.get("sentence_embedding"))
            .ok_or_else(|| anyhow::anyhow!("No embedding output found in model outputs"))?;

        let hidden = output.try_extract_tensor::<f32>()?;
        let hidden = hidden.view();

        let mut result = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let mut pooled = vec![0.0f32; self.dim];
            let mut token_count = 0.0f32;

            // Mask-weighted mean over the sequence dimension.
            for j in 0..max_len {
                if attention_mask[i * max_len + j] == 0 {
                    continue;
                }
                token_count += 1.0;
                for k in 0..self.dim {
                    pooled[k] += hidden[[i, j, k]];
                }
            }
            if token_count > 0.0 {
                for x in &mut pooled {
                    *x /= token_count;
                }
            }
            normalize(&mut pooled);
            result.push(pooled);
        }

        Ok(result)
    }
}

impl Embedder for OnnxEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.encode_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding generated"))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.encode_batch(texts)
    }
}

/// Normalize embedding to unit length.
fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in embedding.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_produces_unit_vector() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 0.001);
        assert!((v[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_normalize_zero_vector_unchanged() {
        let mut v = vec![0.0, 0.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn test_load_missing_directory_fails() {
        let dir = std::path::Path::new("/nonexistent/model/dir");
        assert!(OnnxEmbedder::load(dir).is_err());
    }
}
