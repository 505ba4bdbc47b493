//! Paginated web search for candidate file URLs.
//!
//! [`SearchClient::search`] returns a [`SearchPager`]: a lazy, finite sequence
//! of [`SearchResult`]s scoped to one domain and file extension. Pages are
//! requested one at a time and only when the consumer asks for more, so a
//! download loop that reaches its target stops spending API quota.
//!
//! # Error handling
//!
//! | Response | Result |
//! |----------|--------|
//! | 403, 429 | [`SearchError::RateLimited`], no retry |
//! | other 4xx | [`SearchError::InvalidRequest`] with the API message |
//! | 5xx, network, timeout | retried per [`RetryPolicy`](crate::RetryPolicy), then [`SearchError::Transient`] |
//! | 2xx with undecodable body | [`SearchError::MalformedResponse`] |

mod client;
mod error;
mod query;

use std::collections::VecDeque;

use async_trait::async_trait;

pub use client::{DEFAULT_SEARCH_ENDPOINT, MAX_RESULT_WINDOW, PAGE_SIZE, SearchClient, SearchPager};
pub use error::SearchError;
pub use query::{build_query, normalize_extension};

/// A candidate file found by the search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// URL of the file.
    pub url: String,
    /// Result title, when the API supplied one.
    pub title: Option<String>,
}

impl SearchResult {
    /// Creates a result without a title.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }
}

/// A sequence of download candidates.
///
/// Implemented by [`SearchPager`] for live searches and by [`CandidateList`]
/// for fixed inputs.
#[async_trait]
pub trait CandidateSource: Send {
    /// Returns the next candidate, `Ok(None)` when exhausted.
    ///
    /// # Errors
    ///
    /// Returns the [`SearchError`] that ended the sequence.
    async fn next_candidate(&mut self) -> Result<Option<SearchResult>, SearchError>;
}

/// In-memory candidate sequence.
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    remaining: VecDeque<SearchResult>,
    consumed: usize,
}

impl CandidateList {
    /// Creates a list yielding `candidates` in order.
    #[must_use]
    pub fn new(candidates: Vec<SearchResult>) -> Self {
        Self {
            remaining: candidates.into(),
            consumed: 0,
        }
    }

    /// Creates a list from bare URLs.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(urls.into_iter().map(SearchResult::new).collect())
    }

    /// Number of candidates handed out so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of candidates not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[async_trait]
impl CandidateSource for CandidateList {
    async fn next_candidate(&mut self) -> Result<Option<SearchResult>, SearchError> {
        let next = self.remaining.pop_front();
        if next.is_some() {
            self.consumed += 1;
        }
        Ok(next)
    }
}
