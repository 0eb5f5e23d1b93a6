//! Fetch error taxonomy and classification
//!
//! This module defines the closed set of errors a fetch attempt can produce
//! and classifies each one into a category and a recovery hint so callers can
//! decide what to do next.

pub mod classification;

use std::time::Duration;

use thiserror::Error;

// Re-export main types for convenient access
pub use classification::{ErrorCategory, RecoveryHint};

/// Message carried by a network error raised when an attempt runs out of time.
pub const NETWORK_TIMEOUT_MESSAGE: &str = "Network timeout";

/// An error produced by a single fetch attempt.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The remote could not be reached.
    #[error("{message}")]
    Network {
        /// Human-readable error message.
        message: String,
        /// Whether the failure is transient and a manual retry may succeed.
        temporary: bool,
    },
    /// The remote answered with a payload that could not be understood.
    #[error("{message}")]
    InvalidResponse {
        /// Human-readable error message.
        message: String,
    },
    /// The remote refused the request until `retry_after` has passed.
    #[error("{message}")]
    RateLimited {
        /// Human-readable error message.
        message: String,
        /// How long the caller must wait before trying again.
        retry_after: Duration,
    },
    /// Catch-all for failures outside the known kinds.
    #[error("{message}")]
    Unknown {
        /// Human-readable error message.
        message: String,
    },
}

impl FetchError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>, temporary: bool) -> Self {
        Self::Network {
            message: message.into(),
            temporary,
        }
    }

    /// Creates the temporary network error used when an attempt times out.
    pub fn timeout() -> Self {
        Self::network(NETWORK_TIMEOUT_MESSAGE, true)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a rate limit error that asks the caller to wait `retry_after`.
    pub fn rate_limited(message: impl Into<String>, retry_after: Duration) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates an unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::InvalidResponse { message }
            | Self::RateLimited { message, .. }
            | Self::Unknown { message } => message,
        }
    }

    /// Returns the wait requested by a rate limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Returns true for a network error flagged as temporary.
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Network { temporary: true, .. })
    }
}
