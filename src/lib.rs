//! # Book Harvest
//!
//! Collects book metadata from the Google Books volumes API for a fixed list of topics,
//! pages through a fixed window of results per topic, deduplicates by title and writes
//! the rows to a CSV file.
//!
//! ## Architecture
//!
//! - [`models`]: Book records, API response shapes, queries and page windows
//! - [`harvest`]: The fetch-and-accumulate pass ([`Harvester`])
//! - [`utils`]: HTTP client, retry state machine, deduplication and CSV output
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal progress and result preview

pub mod config;
pub mod harvest;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use harvest::{HarvestError, HarvestSummary, Harvester};
pub use models::BookRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
