use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub adzuna_app_id: String,
    pub adzuna_app_key: String,
    pub adzuna_base_url: String,
    /// Adzuna country segment, e.g. "us" or "gb".
    pub adzuna_country: String,
    /// Directory holding `model.onnx` + `tokenizer.json` for the sentence
    /// encoder. When unset, tone scoring runs degraded (all zeros).
    pub embedding_model_dir: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            adzuna_app_id: require_env("ADZUNA_APP_ID")?,
            adzuna_app_key: require_env("ADZUNA_APP_KEY")?,
            adzuna_base_url: std::env::var("ADZUNA_BASE_URL")
                .unwrap_or_else(|_| "https://api.adzuna.com/v1/api".to_string()),
            adzuna_country: std::env::var("ADZUNA_COUNTRY").unwrap_or_else(|_| "us".to_string()),
            embedding_model_dir: std::env::var("EMBEDDING_MODEL_DIR").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
