use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{FetchOutcome, Fetcher, OutcomeSelector};
use crate::settings::{FetchConfig, DEFAULT_RETRY_AFTER};

/// A fetcher that never touches the network. Each attempt asks its selector
/// for an outcome, optionally sleeps for a simulated latency, and returns it.
#[derive(Debug, Clone)]
pub struct SimulatedFetcher<S> {
    selector: S,
    retry_after: Duration,
    latency: Duration,
    attempts: u32,
}

impl<S: OutcomeSelector> SimulatedFetcher<S> {
    /// Creates a fetcher with the default rate limit wait and no latency.
    pub fn new(selector: S) -> Self {
        Self {
            selector,
            retry_after: DEFAULT_RETRY_AFTER,
            latency: Duration::ZERO,
            attempts: 0,
        }
    }

    /// Creates a fetcher using the wait and latency from `config`.
    pub fn from_config(selector: S, config: &FetchConfig) -> Self {
        Self::new(selector)
            .with_retry_after(config.retry_after)
            .with_latency(config.latency)
    }

    /// Sets the wait carried by rate limit errors.
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Sets how long each attempt takes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[async_trait]
impl<S: OutcomeSelector> Fetcher for SimulatedFetcher<S> {
    async fn fetch(&mut self) -> FetchOutcome {
        self.attempts += 1;
        let kind = self.selector.select();
        debug!(attempt = self.attempts, outcome = %kind, "simulated fetch");

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        kind.into_outcome(self.retry_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::{OutcomeKind, ScriptedSelector};

    #[tokio::test]
    async fn test_returns_selected_outcome_and_counts_attempts() {
        let mut fetcher = SimulatedFetcher::new(ScriptedSelector::new([
            OutcomeKind::Success,
            OutcomeKind::Unknown,
        ]));

        assert_eq!(fetcher.fetch().await, Ok(()));
        assert_eq!(
            fetcher.fetch().await,
            Err(FetchError::unknown("unknown error"))
        );
        assert_eq!(fetcher.attempts(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_uses_configured_wait() {
        let config = FetchConfig::new().with_retry_after(Duration::from_millis(300));
        let selector = ScriptedSelector::new([OutcomeKind::RateLimit]);
        let mut fetcher = SimulatedFetcher::from_config(selector, &config);

        let err = fetcher.fetch().await.unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_millis(300)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_the_outcome() {
        let mut fetcher = SimulatedFetcher::new(ScriptedSelector::new([OutcomeKind::Success]))
            .with_latency(Duration::from_millis(80));

        let start = tokio::time::Instant::now();
        assert_eq!(fetcher.fetch().await, Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
