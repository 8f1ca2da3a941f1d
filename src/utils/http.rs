//! HTTP client utilities.

use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use super::retry::{with_retry, Classify, FailureClass, RetryPolicy, RetryResult, Sleeper};

/// A 2xx response with its body fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Failure of a single GET attempt
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Could not connect (refused, reset, DNS, connect timeout)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Connection dropped or body was cut short while reading
    #[error("Transfer interrupted: {0}")]
    Truncated(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// Anything else reqwest reports
    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(err)
    }
}

impl FetchError {
    /// Classify a reqwest error by the phase it failed in.
    ///
    /// The URL is stripped from the message so the API key never reaches the logs.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        // A connection the server resets or closes before answering surfaces as a
        // request error, not a connect error. Timeouts stay permanent.
        let connect = err.is_connect()
            || (err.is_request() && !err.is_timeout() && err.status().is_none())
            || connection_dropped(&err);
        let body = err.is_body() || err.is_decode();
        let status = err.status();
        let message = err.without_url().to_string();

        if connect {
            FetchError::Connect(message)
        } else if body {
            FetchError::Truncated(message)
        } else if let Some(status) = status {
            FetchError::Status {
                status,
                url: String::new(),
            }
        } else {
            FetchError::Request(message)
        }
    }
}

/// Whether an IO error anywhere in the source chain means the peer went away.
fn connection_dropped(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

impl Classify for FetchError {
    fn class(&self) -> FailureClass {
        match self {
            FetchError::Connect(_) | FetchError::Truncated(_) => FailureClass::Transient,
            FetchError::Status { .. } | FetchError::Request(_) => FailureClass::Permanent,
        }
    }
}

/// Replace the value of the `key` query parameter so URLs can be logged.
pub fn redact_key(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let params: Vec<String> = query
        .split('&')
        .map(|param| {
            if param.starts_with("key=") {
                "key=REDACTED".to_string()
            } else {
                param.to_string()
            }
        })
        .collect();

    format!("{}?{}", base, params.join("&"))
}

/// HTTP client that retries transient failures according to a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl HttpClient {
    /// Create a client with a fixed per-request timeout
    pub fn new(
        timeout: Duration,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .build()?;

        Ok(Self::from_client(Arc::new(client), policy, sleeper))
    }

    /// Create from an existing reqwest Client
    pub fn from_client(
        client: Arc<Client>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    /// One GET. The body is read here so an interrupted transfer counts as a failed attempt.
    pub async fn get_once(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: redact_key(url),
            });
        }

        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    /// GET with retries. `None` once retries are exhausted or on any non-transient failure.
    pub async fn retrying_get(&self, url: &str) -> Option<HttpResponse> {
        let result = with_retry(self.policy, self.sleeper.as_ref(), |attempt| {
            tracing::debug!("GET {} (attempt {})", redact_key(url), attempt);
            self.get_once(url)
        })
        .await;

        match result {
            RetryResult::Success(response) => Some(response),
            RetryResult::TransientFailure(error, attempts) => {
                tracing::error!(
                    "Giving up on {} after {} attempts: {}",
                    redact_key(url),
                    attempts,
                    error
                );
                None
            }
            RetryResult::PermanentFailure(_) => None,
        }
    }
}
