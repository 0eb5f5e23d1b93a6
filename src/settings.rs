//! Fetch configuration.
//!
//! Settings can be built in code with the `with_*` builder methods or loaded
//! from a TOML file layered under environment variable overrides.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FETCH_DISPATCH";

/// Default wait carried by a rate limit error.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Errors that can occur when loading fetch configuration.
#[derive(Debug, Error)]
pub enum FetchConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),
}

/// Settings for the simulated fetch and its dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Wait carried by a rate limit error before the single retry.
    /// Default: 2 seconds
    pub retry_after: Duration,

    /// Simulated time each attempt takes.
    /// Default: zero
    pub latency: Duration,

    /// Deadline for a single attempt; `None` disables it.
    pub attempt_timeout: Option<Duration>,

    /// Seed for outcome selection; `None` seeds from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_after: DEFAULT_RETRY_AFTER,
            latency: Duration::ZERO,
            attempt_timeout: None,
            seed: None,
        }
    }
}

/// On-disk and environment representation, in milliseconds.
#[derive(Debug, Default, Deserialize)]
struct RawFetchConfig {
    #[serde(default)]
    retry_after_ms: Option<u64>,
    #[serde(default)]
    latency_ms: Option<u64>,
    #[serde(default)]
    attempt_timeout_ms: Option<u64>,
    /// TOML integers are signed 64-bit, so the seed is read as `i64` and
    /// its bits reused. Negative values cover seeds above `i64::MAX`.
    #[serde(default)]
    seed: Option<i64>,
}

impl From<RawFetchConfig> for FetchConfig {
    fn from(raw: RawFetchConfig) -> Self {
        let defaults = FetchConfig::default();
        Self {
            retry_after: raw
                .retry_after_ms
                .map_or(defaults.retry_after, Duration::from_millis),
            latency: raw.latency_ms.map_or(defaults.latency, Duration::from_millis),
            attempt_timeout: raw.attempt_timeout_ms.map(Duration::from_millis),
            seed: raw.seed.map(|seed| seed as u64),
        }
    }
}

impl FetchConfig {
    /// Creates a new FetchConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// Environment variables override file values using the format
    /// `FETCH_DISPATCH__<KEY>` (e.g. `FETCH_DISPATCH__RETRY_AFTER_MS=500`).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration file does not exist
    /// - The configuration file cannot be parsed
    /// - The path is not valid UTF-8
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FetchConfigError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| FetchConfigError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(FetchConfigError::FileNotFound(path_str.to_string()));
        }

        Self::build(Some(path_str))
    }

    /// Loads configuration from environment variables only, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, FetchConfigError> {
        Self::build(None)
    }

    fn build(file: Option<&str>) -> Result<Self, FetchConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let raw: RawFetchConfig = config.try_deserialize()?;
        Ok(raw.into())
    }

    /// Sets the rate limit wait.
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Sets the simulated latency per attempt.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Sets the per-attempt deadline.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Sets the selection seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn test_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.retry_after, Duration::from_secs(2));
        assert_eq!(config.latency, Duration::ZERO);
        assert_eq!(config.attempt_timeout, None);
        assert_eq!(config.seed, None);
        assert_eq!(config, FetchConfig::new());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FetchConfig::new()
            .with_retry_after(Duration::from_millis(500))
            .with_latency(Duration::from_millis(20))
            .with_attempt_timeout(Duration::from_millis(100))
            .with_seed(9);

        assert_eq!(config.retry_after, Duration::from_millis(500));
        assert_eq!(config.latency, Duration::from_millis(20));
        assert_eq!(config.attempt_timeout, Some(Duration::from_millis(100)));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
            retry_after_ms = 750
            latency_ms = 30
            attempt_timeout_ms = 10
            seed = 42
            "#,
        );

        let config = FetchConfig::load(file.path()).expect("Failed to load config");
        assert_eq!(config.retry_after, Duration::from_millis(750));
        assert_eq!(config.latency, Duration::from_millis(30));
        assert_eq!(config.attempt_timeout, Some(Duration::from_millis(10)));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config("seed = 3\n");

        let config = FetchConfig::load(file.path()).expect("Failed to load config");
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.retry_after, DEFAULT_RETRY_AFTER);
        assert_eq!(config.attempt_timeout, None);
    }

    #[test]
    fn test_negative_seed_maps_to_upper_half() {
        let file = write_config("seed = -1\n");

        let config = FetchConfig::load(file.path()).expect("Failed to load config");
        assert_eq!(config.seed, Some(u64::MAX));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = dir.path().join("absent.toml");

        let err = FetchConfig::load(&missing).unwrap_err();
        assert!(matches!(err, FetchConfigError::FileNotFound(_)));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_load_malformed_file() {
        let file = write_config("retry_after_ms = \"soon\"\n");

        let err = FetchConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, FetchConfigError::ParseError(_)));
    }
}
