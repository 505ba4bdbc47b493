//! Error types for search API operations.

use thiserror::Error;

/// Errors that end a search run.
///
/// Every variant is fatal for the run: quota errors are not retried at all and
/// transient errors are only reported once the retry budget is spent.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Daily quota or rate limit hit (HTTP 403 or 429).
    #[error("search API quota or rate limit exceeded (HTTP {status}){}", detail(.message.as_deref()))]
    RateLimited {
        /// The HTTP status code.
        status: u16,
        /// API-provided message, if any.
        message: Option<String>,
    },

    /// The API rejected the request (other 4xx), typically bad credentials.
    #[error("search API rejected the request (HTTP {status}): {message}")]
    InvalidRequest {
        /// The HTTP status code.
        status: u16,
        /// API-provided message, verbatim.
        message: String,
    },

    /// Server errors or network failures that persisted through every retry.
    #[error("search API unavailable after {attempts} attempt(s): {reason}")]
    Transient {
        /// Attempts made, including the first.
        attempts: u32,
        /// The last failure observed.
        reason: String,
    },

    /// The API answered 2xx with a body that is not a search response.
    #[error("unexpected search API response: {reason}")]
    MalformedResponse {
        /// Decoder error description.
        reason: String,
    },

    /// The search client could not be constructed.
    #[error("search client setup failed: {reason}")]
    Setup {
        /// What went wrong.
        reason: String,
    },
}

fn detail(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl SearchError {
    /// Creates a rate-limit error.
    #[must_use]
    pub fn rate_limited(status: u16, message: Option<String>) -> Self {
        Self::RateLimited { status, message }
    }

    /// Creates an invalid-request error.
    pub fn invalid_request(status: u16, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            status,
            message: message.into(),
        }
    }

    /// Creates a transient error after `attempts` attempts.
    pub fn transient(attempts: u32, reason: impl Into<String>) -> Self {
        Self::Transient {
            attempts,
            reason: reason.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Creates a setup error.
    pub fn setup(reason: impl Into<String>) -> Self {
        Self::Setup {
            reason: reason.into(),
        }
    }

    /// Remediation hint shown to the user alongside the error.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RateLimited { .. } => Some(
                "The free tier allows 100 search queries per day. Wait for the daily quota to reset or enable billing. A 403 can also mean the Custom Search API is not enabled for this key.",
            ),
            Self::InvalidRequest { .. } => Some(
                "Check your API key and search engine ID (--api-key, --search-engine-id or the saved credential file).",
            ),
            Self::Transient { .. } => Some("The search API may be temporarily unavailable. Try again later."),
            Self::MalformedResponse { .. } | Self::Setup { .. } => None,
        }
    }
}
