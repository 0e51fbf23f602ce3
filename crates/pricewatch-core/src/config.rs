use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::retry::{BackoffPolicy, JitterMode};

pub const DEFAULT_API_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of remote-call attempts per tick (including the first).
    pub max_retries: u32,
    /// Exponential backoff growth factor (>= 1).
    pub backoff_factor: f64,
    /// Maximum backoff delay in seconds.
    pub max_backoff_secs: u64,
    /// Jitter strategy: "random" (additive sub-second) or "full".
    #[serde(default)]
    pub jitter_mode: JitterMode,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_factor: 2.0,
            max_backoff_secs: 60,
            jitter_mode: JitterMode::Random,
        }
    }
}

impl RetryConfig {
    /// Build the runtime backoff policy from these parameters.
    pub fn policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            factor: self.backoff_factor,
            max_backoff: Duration::from_secs(self.max_backoff_secs),
            jitter: self.jitter_mode,
            max_retries: self.max_retries,
        }
    }
}

/// Global configuration loaded from `~/.config/pricewatch/config.toml`.
///
/// The API key is deliberately absent: it comes from the `CMC_API_KEY`
/// environment variable so it never lands in a world-readable file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Instrument symbol to track (e.g. "BTC").
    pub symbol: String,
    /// Quote currency to convert into (e.g. "USD").
    pub currency: String,
    /// Nominal seconds between ticks.
    pub interval_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Quote endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Retry policy; built-in defaults when the section is missing.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC".to_string(),
            currency: "USD".to_string(),
            interval_secs: 60,
            request_timeout_secs: 10,
            api_url: default_api_url(),
            retry: RetryConfig::default(),
        }
    }
}

/// Startup-time validation failures. The scheduler must never start on a
/// config that fails here.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("interval must be positive")]
    ZeroInterval,
    #[error("request timeout must be positive")]
    ZeroTimeout,
    #[error("max_retries must be at least 1")]
    ZeroRetries,
    #[error("backoff_factor must be >= 1, got {0}")]
    FactorTooSmall(f64),
    #[error("max_backoff must be positive")]
    ZeroMaxBackoff,
    #[error("symbol must be non-empty alphanumeric, got '{0}'")]
    InvalidSymbol(String),
    #[error("currency must be non-empty alphanumeric, got '{0}'")]
    InvalidCurrency(String),
}

fn valid_ticker(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.retry.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        if !(self.retry.backoff_factor >= 1.0) {
            return Err(ConfigError::FactorTooSmall(self.retry.backoff_factor));
        }
        if self.retry.max_backoff_secs == 0 {
            return Err(ConfigError::ZeroMaxBackoff);
        }
        if !valid_ticker(&self.symbol) {
            return Err(ConfigError::InvalidSymbol(self.symbol.clone()));
        }
        if !valid_ticker(&self.currency) {
            return Err(ConfigError::InvalidCurrency(self.currency.clone()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pricewatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TrackerConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TrackerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: TrackerConfig = toml::from_str(&data)?;
    Ok(cfg)
}
