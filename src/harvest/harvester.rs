//! Harvester implementation.

use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::HarvestError;
use crate::config::Config;
use crate::models::{page_windows, BookRecord, PageWindow, VolumesResponse};
use crate::utils::{
    deduplicate_by_title, find_duplicates, redact_key, write_csv_file, HttpClient, Sleeper,
    TokioSleeper,
};

/// Path of the volumes search endpoint, appended to `api_base`.
pub const VOLUMES_PATH: &str = "/books/v1/volumes";

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    /// Records collected before deduplication
    pub fetched: usize,
    /// Rows written after deduplication
    pub written: usize,
    /// Records dropped because an earlier record had the same title
    pub duplicates: usize,
    /// Page requests that produced no response
    pub failed_pages: usize,
    /// Where the CSV was written
    pub output_path: PathBuf,
    /// The deduplicated rows, in output order
    pub records: Vec<BookRecord>,
}

/// Drives one collection pass.
pub struct Harvester {
    http: HttpClient,
    sleeper: Arc<dyn Sleeper>,
    api_base: String,
    api_key: String,
    queries: Vec<String>,
    page_size: u32,
    max_start_index: u32,
    politeness_delay: Duration,
    output_path: PathBuf,
    progress: ProgressBar,
}

impl Harvester {
    /// Create a harvester that sleeps on the tokio timer.
    ///
    /// Fails with [`ConfigError::MissingApiKey`](crate::config::ConfigError::MissingApiKey)
    /// before any network activity if no key is configured.
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        Self::with_sleeper(config, Arc::new(TokioSleeper))
    }

    /// Create a harvester whose backoff and politeness waits go through `sleeper`.
    pub fn with_sleeper(
        config: &Config,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, HarvestError> {
        let api_key = config.require_api_key()?.to_string();
        config.validate()?;

        let http = HttpClient::new(
            config.request_timeout(),
            config.retry_policy(),
            sleeper.clone(),
        )?;

        Ok(Self {
            http,
            sleeper,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            queries: config.queries.clone(),
            page_size: config.page_size,
            max_start_index: config.max_start_index,
            politeness_delay: config.politeness_delay(),
            output_path: config.output_path.clone(),
            progress: ProgressBar::hidden(),
        })
    }

    /// Report page progress on `progress` instead of a hidden bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Number of page requests a full pass issues.
    pub fn total_pages(&self) -> usize {
        self.queries.len() * self.windows().count()
    }

    fn windows(&self) -> impl Iterator<Item = PageWindow> {
        page_windows(self.max_start_index, self.page_size)
    }

    /// Request URL for one page of one query.
    pub fn page_url(&self, query: &str, window: PageWindow) -> String {
        format!(
            "{}{}?q={}&startIndex={}&maxResults={}&key={}",
            self.api_base,
            VOLUMES_PATH,
            urlencoding::encode(query),
            window.start_index,
            window.max_results,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Parse a volumes response body into records for `query`.
    ///
    /// A body without `items` yields no records.
    pub fn parse_page(body: &str, query: &str) -> Result<Vec<BookRecord>, HarvestError> {
        let response: VolumesResponse = serde_json::from_str(body)?;
        Ok(response.into_records(query))
    }

    /// Fetch one page. A failed request yields an empty page.
    pub async fn fetch_page(
        &self,
        query: &str,
        window: PageWindow,
    ) -> Result<Vec<BookRecord>, HarvestError> {
        Ok(self.try_fetch_page(query, window).await?.unwrap_or_default())
    }

    /// `Ok(None)` when the request failed and the page was skipped.
    async fn try_fetch_page(
        &self,
        query: &str,
        window: PageWindow,
    ) -> Result<Option<Vec<BookRecord>>, HarvestError> {
        let url = self.page_url(query, window);

        let Some(response) = self.http.retrying_get(&url).await else {
            tracing::warn!("Skipping {} after multiple failures", redact_key(&url));
            return Ok(None);
        };

        Self::parse_page(&response.body, query).map(Some)
    }

    /// Fetch every page of every query, in order.
    ///
    /// Returns the accumulated records and the number of pages that failed.
    pub async fn collect(&self) -> Result<(Vec<BookRecord>, usize), HarvestError> {
        let mut records = Vec::new();
        let mut failed_pages = 0;

        self.progress.set_length(self.total_pages() as u64);

        for query in &self.queries {
            tracing::info!("Fetching books for query: '{}'", query);
            // printed above the bar; dropped when the bar is hidden
            self.progress
                .println(format!("=== Fetching books for query: '{}' ===", query));

            for window in self.windows() {
                let (first, last) = window.span();
                tracing::info!("Fetching {} books {} to {}...", query, first, last);
                self.progress.set_message(format!("{} {}-{}", query, first, last));

                match self.try_fetch_page(query, window).await? {
                    Some(page) => {
                        tracing::debug!("{} records for '{}' at {}", page.len(), query, first);
                        records.extend(page);
                        self.sleeper.sleep(self.politeness_delay).await;
                    }
                    None => failed_pages += 1,
                }

                self.progress.inc(1);
            }
        }

        Ok((records, failed_pages))
    }

    /// Run the full pass: collect, deduplicate by title, write the CSV.
    pub async fn run(&self) -> Result<HarvestSummary, HarvestError> {
        let (records, failed_pages) = self.collect().await?;
        let fetched = records.len();
        tracing::info!("Total books fetched: {}", fetched);

        let duplicates = find_duplicates(&records).len();
        if duplicates > 0 {
            tracing::info!("Dropping {} records with an already-seen title", duplicates);
        }

        let records = deduplicate_by_title(records);
        let written = write_csv_file(&self.output_path, &records)?;
        tracing::info!("Wrote {} rows to {}", written, self.output_path.display());

        self.progress.finish_and_clear();

        Ok(HarvestSummary {
            fetched,
            written,
            duplicates,
            failed_pages,
            output_path: self.output_path.clone(),
            records,
        })
    }
}
