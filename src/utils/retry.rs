//! Retry with linear backoff for page requests.
//!
//! The loop is driven by [`RetryPolicy::next_state`] and [`RetryPolicy::after_backoff`],
//! two pure transitions over [`RetryState`]. Waiting goes through a [`Sleeper`] so the
//! backoff schedule can be observed in tests without real delays.

use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Retry limits for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts in total, including the first
    pub max_attempts: u32,
    /// Attempt `n` (1-based) is followed by a wait of `n * base_backoff`
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(2),
        }
    }
}

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Connection-level failure or an interrupted transfer
    Transient,
    /// HTTP error status or any other request error
    Permanent,
}

/// Errors that know their own [`FailureClass`].
pub trait Classify {
    fn class(&self) -> FailureClass;
}

/// Result of one attempt, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure(FailureClass),
}

impl AttemptOutcome {
    pub fn of<T, E: Classify>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => AttemptOutcome::Success,
            Err(err) => AttemptOutcome::Failure(err.class()),
        }
    }
}

/// Why the loop stopped without a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveUpReason {
    /// Every attempt failed transiently
    Exhausted,
    /// A permanent failure ended the loop at once
    Permanent,
}

/// States of a retrying request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting { attempt: u32 },
    Succeeded { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    GivenUp { attempt: u32, reason: GiveUpReason },
}

impl RetryPolicy {
    /// Wait after the given 1-based attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff * attempt
    }

    /// Transition out of `Attempting { attempt }` once its outcome is known.
    ///
    /// A transient failure always backs off, even on the last attempt.
    pub fn next_state(&self, attempt: u32, outcome: AttemptOutcome) -> RetryState {
        match outcome {
            AttemptOutcome::Success => RetryState::Succeeded { attempt },
            AttemptOutcome::Failure(FailureClass::Transient) => RetryState::Backoff {
                attempt,
                delay: self.backoff_for(attempt),
            },
            AttemptOutcome::Failure(FailureClass::Permanent) => RetryState::GivenUp {
                attempt,
                reason: GiveUpReason::Permanent,
            },
        }
    }

    /// Transition out of `Backoff { attempt, .. }` after the wait.
    pub fn after_backoff(&self, attempt: u32) -> RetryState {
        if attempt < self.max_attempts {
            RetryState::Attempting {
                attempt: attempt + 1,
            }
        } else {
            RetryState::GivenUp {
                attempt,
                reason: GiveUpReason::Exhausted,
            }
        }
    }
}

/// Something that can wait.
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every requested wait. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded
    Success(T),
    /// Every attempt failed transiently; carries the last error and the attempt count
    TransientFailure(E, u32),
    /// Operation failed with a permanent error
    PermanentFailure(E),
}

impl<T, E> RetryResult<T, E> {
    pub fn ok(self) -> Option<T> {
        match self {
            RetryResult::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy is exhausted.
///
/// `operation` receives the 1-based attempt number.
pub async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> RetryResult<T, E>
where
    E: Classify + fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 1;

    loop {
        let result = operation(attempt).await;
        let next = policy.next_state(attempt, AttemptOutcome::of(&result));

        match (next, result) {
            (_, Ok(value)) => {
                if attempt > 1 {
                    tracing::info!(
                        "Request succeeded on attempt {} after {} transient failures",
                        attempt,
                        attempt - 1
                    );
                }
                return RetryResult::Success(value);
            }
            (RetryState::Backoff { delay, .. }, Err(error)) => {
                tracing::warn!(
                    "Network error: {}. Retrying ({}/{}) in {:?}",
                    error,
                    attempt,
                    policy.max_attempts,
                    delay
                );
                sleeper.sleep(delay).await;

                match policy.after_backoff(attempt) {
                    RetryState::Attempting { attempt: next } => attempt = next,
                    _ => return RetryResult::TransientFailure(error, attempt),
                }
            }
            (_, Err(error)) => {
                tracing::error!("Failed with error: {}. Not retrying", error);
                return RetryResult::PermanentFailure(error);
            }
        }
    }
}
