//! Configuration management.

mod file_config;

pub use file_config::{find_config_file, load_env_file, save_default_config, CONFIG_FILE_NAME};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::DEFAULT_QUERIES;
use crate::utils::RetryPolicy;

/// Environment variable holding the Google Books API key.
pub const API_KEY_ENV: &str = "GOOGLE_BOOKS_API_KEY";

/// Prefix for environment overrides (`BOOK_HARVEST_OUTPUT_PATH`, `BOOK_HARVEST_RETRY__MAX_ATTEMPTS`, ...)
pub const ENV_PREFIX: &str = "BOOK_HARVEST";

/// Largest page the volumes endpoint will serve.
pub const MAX_PAGE_SIZE: u32 = 40;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google Books API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Scheme and host of the API, without the volumes path
    pub api_base: String,

    /// Topics to harvest, in order
    pub queries: Vec<String>,

    /// Results requested per page (`maxResults`)
    pub page_size: u32,

    /// Offsets stop strictly below this value
    pub max_start_index: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Pause after each page, in milliseconds
    pub politeness_delay_ms: u64,

    /// Where the CSV is written
    pub output_path: PathBuf,

    /// Retry settings for transient network failures
    pub retry: RetrySettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            api_base: default_api_base(),
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
            page_size: MAX_PAGE_SIZE,
            max_start_index: 500,
            request_timeout_secs: 15,
            politeness_delay_ms: 500,
            output_path: default_output_path(),
            retry: RetrySettings::default(),
        }
    }
}

fn default_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("books_10000_data.csv")
}

/// Retry configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per request, including the first
    pub max_attempts: u32,

    /// Backoff unit in seconds; attempt `n` waits `n * base_backoff_secs`
    pub base_backoff_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_secs: 2,
        }
    }
}

impl Config {
    /// The API key, or [`ConfigError::MissingApiKey`] if unset or blank.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Reject settings the harvester cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.queries.is_empty() {
            return Err(ConfigError::Invalid("queries must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_backoff: Duration::from_secs(self.retry.base_backoff_secs),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API key not found. Set GOOGLE_BOOKS_API_KEY or `api_key` in the config file")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a file, with `BOOK_HARVEST_*` environment overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Get the configuration from defaults and environment overrides only
pub fn get_config() -> Result<Config, ConfigError> {
    let settings = config::Config::builder().add_source(env_source()).build()?;

    Ok(settings.try_deserialize()?)
}
