//! Outcome kinds.
//!
//! An [`OutcomeKind`] is the flat, field-less choice a selector makes for
//! one attempt. It becomes a [`FetchOutcome`] once the rate limit wait is
//! known, using the fixed messages below.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::FetchOutcome;
use crate::error::FetchError;

/// Message of a temporary network error. Same text as a timed-out attempt.
pub const TEMPORARY_NETWORK_MESSAGE: &str = crate::error::NETWORK_TIMEOUT_MESSAGE;
/// Message of a permanent network error.
pub const PERMANENT_NETWORK_MESSAGE: &str = "Network unreachable";
/// Message of an invalid response error.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response format";
/// Message of a rate limit error.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";
/// Message of an unknown error.
pub const UNKNOWN_MESSAGE: &str = "unknown error";

/// The concrete outcome a selector picks for one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Success,
    TemporaryNetwork,
    PermanentNetwork,
    InvalidResponse,
    RateLimit,
    Unknown,
}

impl OutcomeKind {
    /// Every kind, with success first and the two network flavours apart.
    pub const ALL: [OutcomeKind; 6] = [
        OutcomeKind::Success,
        OutcomeKind::TemporaryNetwork,
        OutcomeKind::PermanentNetwork,
        OutcomeKind::InvalidResponse,
        OutcomeKind::RateLimit,
        OutcomeKind::Unknown,
    ];

    /// Builds the outcome for this kind. `retry_after` is only used by
    /// [`OutcomeKind::RateLimit`].
    pub fn into_outcome(self, retry_after: Duration) -> FetchOutcome {
        match self {
            Self::Success => Ok(()),
            Self::TemporaryNetwork => Err(FetchError::network(TEMPORARY_NETWORK_MESSAGE, true)),
            Self::PermanentNetwork => Err(FetchError::network(PERMANENT_NETWORK_MESSAGE, false)),
            Self::InvalidResponse => Err(FetchError::invalid_response(INVALID_RESPONSE_MESSAGE)),
            Self::RateLimit => Err(FetchError::rate_limited(RATE_LIMIT_MESSAGE, retry_after)),
            Self::Unknown => Err(FetchError::unknown(UNKNOWN_MESSAGE)),
        }
    }

    /// Returns the kind that would have produced `outcome`.
    pub fn of(outcome: &FetchOutcome) -> Self {
        match outcome {
            Ok(()) => Self::Success,
            Err(FetchError::Network {
                temporary: true, ..
            }) => Self::TemporaryNetwork,
            Err(FetchError::Network {
                temporary: false, ..
            }) => Self::PermanentNetwork,
            Err(FetchError::InvalidResponse { .. }) => Self::InvalidResponse,
            Err(FetchError::RateLimited { .. }) => Self::RateLimit,
            Err(FetchError::Unknown { .. }) => Self::Unknown,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::TemporaryNetwork => "temporary-network",
            Self::PermanentNetwork => "permanent-network",
            Self::InvalidResponse => "invalid-response",
            Self::RateLimit => "rate-limit",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_survives_into_outcome() {
        for kind in OutcomeKind::ALL {
            let outcome = kind.into_outcome(Duration::from_secs(2));
            assert_eq!(OutcomeKind::of(&outcome), kind);
        }
    }

    #[test]
    fn test_all_lists_each_kind_once() {
        let names: std::collections::HashSet<String> =
            OutcomeKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names.len(), OutcomeKind::ALL.len());
        assert_eq!(OutcomeKind::ALL[0], OutcomeKind::Success);
    }

    #[test]
    fn test_rate_limit_uses_given_wait() {
        let outcome = OutcomeKind::RateLimit.into_outcome(Duration::from_millis(250));
        let err = outcome.unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_millis(250)));
        assert_eq!(err.message(), RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn test_network_flavours() {
        let temporary = OutcomeKind::TemporaryNetwork
            .into_outcome(Duration::ZERO)
            .unwrap_err();
        let permanent = OutcomeKind::PermanentNetwork
            .into_outcome(Duration::ZERO)
            .unwrap_err();
        assert!(temporary.is_temporary());
        assert_eq!(temporary.message(), "Network timeout");
        assert!(!permanent.is_temporary());
        assert_eq!(permanent.message(), "Network unreachable");
    }

    #[test]
    fn test_display_is_kebab_case() {
        assert_eq!(OutcomeKind::InvalidResponse.to_string(), "invalid-response");
        assert_eq!(
            serde_json::to_string(&OutcomeKind::RateLimit).unwrap(),
            "\"rate-limit\""
        );
    }
}
