//! Utility modules supporting the harvest.
//!
//! - [`deduplicate_by_title`]: Keep the first record for each title
//! - [`HttpClient`]: reqwest wrapper whose `retrying_get` retries transient failures
//! - [`with_retry`]: The retry loop, driven by [`RetryPolicy`] state transitions
//! - [`Sleeper`]: Injectable wait, so backoff can be observed without real delays
//! - [`write_csv_file`]: CSV output of harvested records
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use book_harvest::utils::{HttpClient, RetryPolicy, TokioSleeper};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(
//!     Duration::from_secs(15),
//!     RetryPolicy::default(),
//!     Arc::new(TokioSleeper),
//! )?;
//! if let Some(response) = client.retrying_get("https://www.googleapis.com/books/v1/volumes?q=art").await {
//!     println!("{}", response.body);
//! }
//! # Ok(())
//! # }
//! ```

mod dedup;
mod export;
mod http;
mod retry;

pub use dedup::{deduplicate_by_title, find_duplicates};
pub use export::{write_csv, write_csv_file};
pub use http::{redact_key, FetchError, HttpClient, HttpResponse};
pub use retry::{
    with_retry, AttemptOutcome, Classify, FailureClass, GiveUpReason, RecordingSleeper,
    RetryPolicy, RetryResult, RetryState, Sleeper, TokioSleeper,
};
