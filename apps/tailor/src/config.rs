use std::path::PathBuf;

use anyhow::{Context, Result};

/// Pipeline configuration loaded from environment variables.
///
/// Only the model API key is mandatory; everything else degrades gracefully
/// (no web search without a Serper key, built-in catalogue without an override).
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub serper_api_key: Option<String>,
    pub github_url: Option<String>,
    /// Background text used when a request carries no work experience.
    pub personal_writeup: Option<String>,
    pub stage_catalogue_path: Option<PathBuf>,
    /// Transport attempts per model call. 1 means no automatic retry.
    pub llm_max_attempts: u32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            serper_api_key: optional_env("SERPER_API_KEY"),
            github_url: optional_env("GITHUB_URL"),
            personal_writeup: optional_env("PERSONAL_WRITEUP"),
            stage_catalogue_path: optional_env("STAGE_CATALOGUE_PATH").map(PathBuf::from),
            llm_max_attempts: std::env::var("LLM_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "1".to_string())
                .parse::<u32>()
                .context("LLM_MAX_ATTEMPTS must be a positive integer")?
                .max(1),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
