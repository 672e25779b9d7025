use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::OracleSettings;
use crate::matching::orchestrator::MatchSettings;
use crate::matching::scorer::ScoringLimits;

const DEFAULT_ORACLE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_ORACLE_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub oracle_api_key: String,
    pub oracle_api_url: String,
    pub oracle_model: String,
    pub oracle_timeout_secs: u64,
    pub oracle_max_retries: u32,
    /// Unset means the in-process store; state is lost on restart.
    pub redis_url: Option<String>,
    pub store_prefix: String,
    pub match_batch_size: usize,
    pub match_batch_delay_ms: u64,
    pub display_batch_size: usize,
    pub resume_char_budget: usize,
    pub description_char_budget: usize,
    pub extraction_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            oracle_api_key: require_env("ORACLE_API_KEY")?,
            oracle_api_url: env_or("ORACLE_API_URL", DEFAULT_ORACLE_URL),
            oracle_model: env_or("ORACLE_MODEL", DEFAULT_ORACLE_MODEL),
            oracle_timeout_secs: parse_env("ORACLE_TIMEOUT_SECS", 60)?,
            oracle_max_retries: parse_env("ORACLE_MAX_RETRIES", 3)?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            store_prefix: env_or("STORE_PREFIX", "jobrank"),
            match_batch_size: parse_env("MATCH_BATCH_SIZE", 3)?,
            match_batch_delay_ms: parse_env("MATCH_BATCH_DELAY_MS", 1000)?,
            display_batch_size: parse_env("DISPLAY_BATCH_SIZE", 10)?,
            resume_char_budget: parse_env("RESUME_CHAR_BUDGET", 1500)?,
            description_char_budget: parse_env("DESCRIPTION_CHAR_BUDGET", 1500)?,
            extraction_timeout_secs: parse_env("EXTRACTION_TIMEOUT_SECS", 10)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.match_batch_size == 0 {
            bail!("MATCH_BATCH_SIZE must be at least 1");
        }
        if self.display_batch_size == 0 {
            bail!("DISPLAY_BATCH_SIZE must be at least 1");
        }
        Ok(())
    }

    pub fn oracle_settings(&self) -> OracleSettings {
        OracleSettings {
            api_url: self.oracle_api_url.clone(),
            api_key: self.oracle_api_key.clone(),
            model: self.oracle_model.clone(),
            timeout_secs: self.oracle_timeout_secs,
            max_retries: self.oracle_max_retries,
        }
    }

    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            batch_size: self.match_batch_size,
            batch_delay: Duration::from_millis(self.match_batch_delay_ms),
            limits: ScoringLimits {
                resume_chars: self.resume_char_budget,
                description_chars: self.description_char_budget,
            },
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        oracle_api_key: "test-key".to_string(),
        oracle_api_url: DEFAULT_ORACLE_URL.to_string(),
        oracle_model: DEFAULT_ORACLE_MODEL.to_string(),
        oracle_timeout_secs: 60,
        oracle_max_retries: 0,
        redis_url: None,
        store_prefix: "jobrank-test".to_string(),
        match_batch_size: 3,
        match_batch_delay_ms: 0,
        display_batch_size: 10,
        resume_char_budget: 1500,
        description_char_budget: 1500,
        extraction_timeout_secs: 10,
        max_upload_bytes: 10 * 1024 * 1024,
        port: 8080,
        rust_log: "info".to_string(),
    }
}
