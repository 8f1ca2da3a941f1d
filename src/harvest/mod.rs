//! The fetch-and-accumulate pass over the Google Books volumes API.
//!
//! [`Harvester`] walks every configured query through a fixed span of page windows,
//! flattens each page into [`BookRecord`](crate::models::BookRecord)s, deduplicates the
//! collected set by title and writes it as CSV.
//!
//! A page whose request fails (after retries, for transient errors) contributes no records
//! and the pass moves on. Only configuration problems, an unparseable 2xx body, or an
//! unwritable output file stop a run.

mod harvester;

pub use harvester::{HarvestSummary, Harvester, VOLUMES_PATH};

use crate::config::ConfigError;
use crate::utils::FetchError;

/// Errors that abort a harvest
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// Missing key or invalid settings
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] FetchError),

    /// A successful response whose body is not the expected JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for HarvestError {
    fn from(err: serde_json::Error) -> Self {
        HarvestError::Parse(format!("JSON: {}", err))
    }
}
