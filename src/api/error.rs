//! Error taxonomy for the API client.
//!
//! Every failure surfaces as one of these variants so the command layer can
//! decide between a plain error message, a forced re-login and a retry. The
//! retry classification and backoff schedule live here as pure functions.

use std::time::Duration;

/// Failures from talking to the ticketing backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The per-attempt wall-clock bound was exceeded and the in-flight call
    /// was aborted. Never retried.
    #[error("request timeout")]
    Timeout,

    /// 401/403 from the backend. Never retried; the session is stale and the
    /// caller must re-login.
    #[error("authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// Any other non-success HTTP status. The message is the backend's
    /// free-text `message` when the body parsed, or a generic
    /// `HTTP <status>` line when it did not.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The transport failed before a status line arrived.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered 2xx with `success: false` and a message.
    #[error("{0}")]
    Backend(String),

    /// A 2xx body that should have carried data did not.
    #[error("response was missing expected data")]
    MissingData,
}

impl ApiError {
    /// Build the status-classified error for a non-success HTTP response.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ApiError::Auth { status, message },
            _ => ApiError::Http { status, message },
        }
    }

    /// Whether another attempt may be made for this failure.
    ///
    /// Timeouts and auth failures are final; everything else (network
    /// errors, 5xx, other 4xx, backend refusals) gets the remaining
    /// attempts.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Timeout | ApiError::Auth { .. })
    }

    /// True for 401/403, which force a re-login.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }
}

/// Delay before the attempt after `attempt` (1-based): 2^attempt seconds.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}
