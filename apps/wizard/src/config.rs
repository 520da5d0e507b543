use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Wizard configuration loaded from environment variables.
/// Every variable has a default, so an empty environment yields a usable config.
#[derive(Debug, Clone)]
pub struct Config {
    pub analysis_api_url: String,
    pub request_timeout: Duration,
    /// Per-task deadline inside a batch. `None` lets tasks run to completion.
    pub task_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            task_timeout: None,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` is this with `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let analysis_api_url = lookup("ANALYSIS_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_secs("REQUEST_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let task_timeout = lookup("TASK_TIMEOUT_SECS")
            .map(|raw| parse_secs("TASK_TIMEOUT_SECS", &raw).map(Duration::from_secs))
            .transpose()?;

        Ok(Config {
            analysis_api_url,
            request_timeout,
            task_timeout,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds, got '{raw}'"))
}
