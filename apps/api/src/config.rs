use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the matching backend (CV/job storage, scoring, statistics).
    pub match_backend_url: String,
    /// Owner recorded on saved jobs and used to list "my jobs" until login exists.
    pub default_user_id: String,
    pub backend_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            match_backend_url: require_env("MATCH_BACKEND_URL")?,
            default_user_id: std::env::var("DEFAULT_USER_ID")
                .unwrap_or_else(|_| "placeholder-user-123".to_string()),
            backend_timeout: Duration::from_secs(
                std::env::var("BACKEND_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse::<u64>()
                    .context("BACKEND_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
