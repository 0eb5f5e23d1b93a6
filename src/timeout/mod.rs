//! Per-attempt deadlines.
//!
//! [`TimeoutFetcher`] bounds each attempt of an inner fetcher. An attempt that
//! outlives its deadline is dropped and reported as a temporary network error.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::FetchError;
use crate::fetch::{FetchOutcome, Fetcher};

/// Wraps a fetcher with an optional deadline per attempt.
#[derive(Debug, Clone)]
pub struct TimeoutFetcher<F> {
    inner: F,
    deadline: Option<Duration>,
}

impl<F: Fetcher> TimeoutFetcher<F> {
    /// Creates a wrapper; `None` leaves attempts unbounded.
    pub fn new(inner: F, deadline: Option<Duration>) -> Self {
        Self { inner, deadline }
    }

    /// Returns the configured deadline.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Returns a reference to the wrapped fetcher.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Unwraps into the inner fetcher.
    pub fn into_inner(self) -> F {
        self.inner
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for TimeoutFetcher<F> {
    async fn fetch(&mut self) -> FetchOutcome {
        let Some(deadline) = self.deadline else {
            return self.inner.fetch().await;
        };

        match tokio::time::timeout(deadline, self.inner.fetch()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    deadline_ms = deadline.as_millis() as u64,
                    "fetch attempt timed out"
                );
                Err(FetchError::timeout())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{OutcomeKind, ScriptedSelector, SimulatedFetcher};

    fn slow_fetcher(kind: OutcomeKind, latency_ms: u64) -> SimulatedFetcher<ScriptedSelector> {
        SimulatedFetcher::new(ScriptedSelector::new([kind]))
            .with_latency(Duration::from_millis(latency_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_shorter_than_latency_times_out() {
        let mut fetcher = TimeoutFetcher::new(
            slow_fetcher(OutcomeKind::Success, 500),
            Some(Duration::from_millis(100)),
        );

        let start = tokio::time::Instant::now();
        let err = fetcher.fetch().await.unwrap_err();

        assert!(err.is_temporary());
        assert_eq!(err, FetchError::timeout());
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_longer_than_latency_passes_through() {
        let mut fetcher = TimeoutFetcher::new(
            slow_fetcher(OutcomeKind::InvalidResponse, 50),
            Some(Duration::from_millis(100)),
        );

        let err = fetcher.fetch().await.unwrap_err();
        assert_eq!(err, FetchError::invalid_response("Invalid response format"));
    }

    #[tokio::test]
    async fn test_no_deadline_is_transparent() {
        let mut fetcher = TimeoutFetcher::new(slow_fetcher(OutcomeKind::Success, 0), None);

        assert_eq!(fetcher.deadline(), None);
        assert_eq!(fetcher.fetch().await, Ok(()));
        assert_eq!(fetcher.into_inner().attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_attempt_still_counts() {
        let mut fetcher = TimeoutFetcher::new(
            slow_fetcher(OutcomeKind::Success, 1_000),
            Some(Duration::from_millis(10)),
        );

        let _ = fetcher.fetch().await;
        assert_eq!(fetcher.inner().attempts(), 1);
    }
}
