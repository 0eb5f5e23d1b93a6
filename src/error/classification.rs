//! Error classification types for fetch errors
//!
//! Every [`FetchError`] maps to exactly one category and one recovery hint.
//! The category is what gets logged; the hint and the advice line are what
//! the user sees.

use std::fmt;
use std::time::Duration;

use super::FetchError;

/// The primary category of an error, determining the general recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Temporary errors that may resolve on retry.
    Transient,
    /// Errors due to rate limits on the remote side.
    UsageLimit,
    /// Errors that will not go away without outside intervention.
    Fatal,
    /// Errors that could not be classified.
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transient => "transient",
            Self::UsageLimit => "usage_limit",
            Self::Fatal => "fatal",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Hints for how to recover from an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryHint {
    /// The user may try again by hand.
    RetryManually,
    /// Retry after the specified duration.
    RetryAfter(Duration),
    /// The user should check their connection.
    CheckConnection,
    /// The user should contact support.
    ContactSupport,
    /// Stop execution entirely.
    StopExecution,
}

impl fmt::Display for RecoveryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryManually => f.write_str("retry_manually"),
            Self::RetryAfter(wait) => write!(f, "retry_after({}ms)", wait.as_millis()),
            Self::CheckConnection => f.write_str("check_connection"),
            Self::ContactSupport => f.write_str("contact_support"),
            Self::StopExecution => f.write_str("stop_execution"),
        }
    }
}

impl FetchError {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network {
                temporary: true, ..
            } => ErrorCategory::Transient,
            Self::Network {
                temporary: false, ..
            }
            | Self::InvalidResponse { .. } => ErrorCategory::Fatal,
            Self::RateLimited { .. } => ErrorCategory::UsageLimit,
            Self::Unknown { .. } => ErrorCategory::Unknown,
        }
    }

    /// Returns the suggested recovery action for this error.
    pub fn recovery_hint(&self) -> RecoveryHint {
        match self {
            Self::Network {
                temporary: true, ..
            } => RecoveryHint::RetryManually,
            Self::Network {
                temporary: false, ..
            } => RecoveryHint::CheckConnection,
            Self::InvalidResponse { .. } => RecoveryHint::ContactSupport,
            Self::RateLimited { retry_after, .. } => RecoveryHint::RetryAfter(*retry_after),
            Self::Unknown { .. } => RecoveryHint::StopExecution,
        }
    }

    /// Returns the one-line advice shown to the user once no further retry
    /// will be made for this error.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network {
                temporary: true, ..
            } => "This is a temporary network error. Please try again.",
            Self::Network {
                temporary: false, ..
            } => "This is a permanent network error. Please check your connection.",
            Self::InvalidResponse { .. } => {
                "The response from the server was invalid. Please contact support."
            }
            Self::RateLimited { .. } => "Rate limit exceeded again. Giving up after one retry.",
            Self::Unknown { .. } => "An unknown error occurred.",
        }
    }
}
