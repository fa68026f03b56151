//! Retry with exponential backoff for transient failures inside adapters and the store.

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exponential backoff schedule: `base * 2^attempt`, with the exponent capped at 5, never above
/// `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay unit.
    pub base: Duration,
    /// Upper bound of a single delay.
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { base: Duration::from_secs(1), max: Duration::from_secs(30) }
    }
}

impl Backoff {
    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay(&self, attempt: usize) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(5) as u32);
        self.base.saturating_mul(factor).min(self.max)
    }
}

/// Why a retried operation gave up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The token was cancelled before the operation succeeded.
    #[error("retry loop cancelled")]
    Cancelled,
    /// Every attempt failed.
    #[error("retry limit ({attempts}) exceeded: {last_error}")]
    Exhausted {
        /// Attempts made.
        attempts: usize,
        /// Error of the last attempt.
        last_error: E,
    },
}

/// Runs `operation` until it succeeds, retrying up to `max_retries` times with backoff.
///
/// Pass `usize::MAX` to retry until cancelled.
pub async fn retry_with_backoff<T, E, Fut>(
    label: &str,
    mut operation: impl FnMut() -> Fut,
    backoff: Backoff,
    max_retries: usize,
    cancel: &CancellationToken,
) -> Result<T, RetryError<E>>
where
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            info!(target: "relay::retry", label, "Retry loop cancelled before attempt");
            return Err(RetryError::Cancelled);
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt > max_retries {
                    warn!(target: "relay::retry", label, %err, "Retry limit ({max_retries}) exceeded");
                    return Err(RetryError::Exhausted { attempts: attempt, last_error: err });
                }

                let delay = backoff.delay(attempt);
                warn!(
                    target: "relay::retry",
                    label,
                    %err,
                    ?delay,
                    "Attempt {attempt}/{max_retries} failed, retrying after delay"
                );

                select! {
                    _ = sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        info!(target: "relay::retry", label, "Retry loop cancelled during backoff");
                        return Err(RetryError::Cancelled);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[rstest]
    #[case(1, 2)]
    #[case(2, 4)]
    #[case(4, 16)]
    #[case(5, 30)]
    #[case(9, 30)]
    fn test_default_backoff(#[case] attempt: usize, #[case] secs: u64) {
        assert_eq!(Backoff::default().delay(attempt), Duration::from_secs(secs));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();

        let counter = calls.clone();
        let result = retry_with_backoff(
            "flaky",
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 { Err("transient") } else { Ok(42) }
                }
            },
            Backoff::default(),
            5,
            &token,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let token = CancellationToken::new();
        let result: Result<(), _> = retry_with_backoff(
            "broken",
            || async { Err::<(), _>("down") },
            Backoff::default(),
            2,
            &token,
        )
        .await;
        assert_eq!(result, Err(RetryError::Exhausted { attempts: 3, last_error: "down" }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_backoff() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(500)).await;
            canceller.cancel();
        });

        let result: Result<(), _> = retry_with_backoff(
            "never",
            || async { Err::<(), _>("down") },
            Backoff::default(),
            usize::MAX,
            &token,
        )
        .await;
        assert_eq!(result, Err(RetryError::Cancelled));
    }
}
