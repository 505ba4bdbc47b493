//! Search API client and the lazy result pager.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::query::{
    SearchItem, SearchResponse, api_error_message, build_query, candidate_url,
    normalize_extension,
};
use super::{CandidateSource, SearchError, SearchResult};
use crate::credentials::Credentials;
use crate::retry::{RetryDecision, RetryPolicy, Sleeper, TokioSleeper};
use crate::user_agent;

/// Default search API endpoint (Google Custom Search JSON API).
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Results per request; the API's maximum.
pub const PAGE_SIZE: u32 = 10;

/// The API refuses to serve results past this 1-based position.
pub const MAX_RESULT_WINDOW: u32 = 100;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Outcome of a single page request before retry handling.
enum PageFailure {
    /// Worth retrying (5xx, network, timeout).
    Retryable(String),
    /// Ends the search immediately.
    Fatal(SearchError),
}

/// Client for the paged search API.
///
/// Holds the credentials it was built with; nothing is read from global state,
/// so tests construct clients with injected credentials and a mock endpoint.
///
/// # Example
///
/// ```no_run
/// use sitefetch_core::{Credentials, SearchClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SearchClient::new(Credentials::new("key", "cx"))?;
/// let mut pager = client.search("example.com", "pdf", 20);
/// while let Some(result) = pager.next().await? {
///     println!("{}", result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SearchClient {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
    retry_policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credentials", &self.credentials)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl SearchClient {
    /// Creates a client for the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Setup`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self, SearchError> {
        Self::with_base_url(credentials, DEFAULT_SEARCH_ENDPOINT)
    }

    /// Creates a client for a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Setup`] if `endpoint` is not a valid URL or the
    /// HTTP client cannot be built.
    pub fn with_base_url(credentials: Credentials, endpoint: &str) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SearchError::setup(format!("invalid search endpoint {endpoint}: {e}")))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(user_agent::default_search_user_agent())
            .gzip(true)
            .build()
            .map_err(|e| SearchError::setup(format!("HTTP client construction failed: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
            retry_policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replaces the retry policy used for transient failures.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Replaces the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Starts a search for `extension` files under `domain`.
    ///
    /// No request is made until the returned pager is polled.
    #[must_use]
    pub fn search(&self, domain: &str, extension: &str, max_results: usize) -> SearchPager<'_> {
        let query = build_query(domain, extension);
        debug!(%query, max_results, "search started");
        SearchPager {
            client: self,
            query,
            extension: normalize_extension(extension),
            max_results,
            next_start: 1,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            yielded: 0,
            pages_fetched: 0,
            finished: max_results == 0,
        }
    }

    /// Fetches one page, retrying transient failures per the retry policy.
    #[instrument(level = "debug", skip(self, query))]
    async fn fetch_page(&self, query: &str, start: u32) -> Result<Vec<SearchItem>, SearchError> {
        let mut attempt = 1;
        loop {
            match self.fetch_page_once(query, start).await {
                Ok(items) => return Ok(items),
                Err(PageFailure::Fatal(error)) => return Err(error),
                Err(PageFailure::Retryable(reason)) => match self.retry_policy.decide(attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next,
                    } => {
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis(),
                            %reason,
                            "search request failed, retrying"
                        );
                        self.sleeper.sleep(delay).await;
                        attempt = next;
                    }
                    RetryDecision::DoNotRetry { reason: why } => {
                        debug!(%why, "giving up on search request");
                        return Err(SearchError::transient(attempt, reason));
                    }
                },
            }
        }
    }

    async fn fetch_page_once(&self, query: &str, start: u32) -> Result<Vec<SearchItem>, PageFailure> {
        let mut request_url = self.endpoint.clone();
        request_url
            .query_pairs_mut()
            .append_pair("key", &self.credentials.api_key)
            .append_pair("cx", &self.credentials.search_engine_id)
            .append_pair("q", query)
            .append_pair("num", &PAGE_SIZE.to_string())
            .append_pair("start", &start.to_string());

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    PageFailure::Fatal(SearchError::setup(e.without_url().to_string()))
                } else if e.is_timeout() {
                    PageFailure::Retryable("request timed out".to_string())
                } else {
                    PageFailure::Retryable(format!("network error: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = api_error_message(&body);
            debug!(status = status.as_u16(), message = ?message, "search API error");
            return Err(classify_status(status, message));
        }

        let body = response.text().await.map_err(|e| {
            PageFailure::Retryable(format!("failed reading response body: {}", e.without_url()))
        })?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| PageFailure::Fatal(SearchError::malformed(e.to_string())))?;
        debug!(items = parsed.items.len(), "search page received");
        Ok(parsed.items)
    }
}

fn classify_status(status: StatusCode, message: Option<String>) -> PageFailure {
    match status.as_u16() {
        403 | 429 => PageFailure::Fatal(SearchError::rate_limited(status.as_u16(), message)),
        s if status.is_server_error() => PageFailure::Retryable(match message {
            Some(message) => format!("HTTP {s}: {message}"),
            None => format!("HTTP {s}"),
        }),
        s => {
            let message = message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| format!("HTTP {s}"), ToString::to_string)
            });
            PageFailure::Fatal(SearchError::invalid_request(s, message))
        }
    }
}

/// Lazy, finite sequence of search results.
///
/// Pages are fetched on demand. Each URL is yielded at most once, in API
/// order, and at most `max_results` results are yielded. Once exhausted or
/// after an error the pager only returns `Ok(None)`.
#[derive(Debug)]
pub struct SearchPager<'a> {
    client: &'a SearchClient,
    query: String,
    extension: String,
    max_results: usize,
    next_start: u32,
    buffer: VecDeque<SearchResult>,
    seen: HashSet<String>,
    yielded: usize,
    pages_fetched: u32,
    finished: bool,
}

impl SearchPager<'_> {
    /// Returns the next distinct result, fetching another page when needed.
    ///
    /// # Errors
    ///
    /// Returns the [`SearchError`] that ended the search; later calls return `Ok(None)`.
    pub async fn next(&mut self) -> Result<Option<SearchResult>, SearchError> {
        loop {
            if self.yielded >= self.max_results {
                self.finish();
                return Ok(None);
            }
            if let Some(result) = self.buffer.pop_front() {
                self.yielded += 1;
                return Ok(Some(result));
            }
            if self.finished {
                return Ok(None);
            }
            if let Err(error) = self.fetch_next_page().await {
                self.finish();
                return Err(error);
            }
        }
    }

    /// Number of result pages requested so far.
    #[must_use]
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Number of results yielded so far.
    #[must_use]
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    async fn fetch_next_page(&mut self) -> Result<(), SearchError> {
        if self.next_start > MAX_RESULT_WINDOW {
            debug!(start = self.next_start, "search result window exhausted");
            self.finish();
            return Ok(());
        }

        let start = self.next_start;
        let items = self.client.fetch_page(&self.query, start).await?;
        self.pages_fetched += 1;
        self.next_start = start.saturating_add(PAGE_SIZE);

        if items.len() < PAGE_SIZE as usize {
            debug!(start, returned = items.len(), "last page of search results");
            self.finished = true;
        }

        for item in &items {
            let Some(url) = candidate_url(item, &self.extension) else {
                debug!(link = ?item.link, "search result has no file link, skipping");
                continue;
            };
            if self.seen.insert(url.clone()) {
                self.buffer.push_back(SearchResult {
                    url,
                    title: item.title.clone(),
                });
            }
        }

        if self.finished && self.seen.is_empty() {
            info!(query = %self.query, "search returned no file links");
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.finished = true;
        self.buffer.clear();
    }
}

#[async_trait]
impl CandidateSource for SearchPager<'_> {
    async fn next_candidate(&mut self) -> Result<Option<SearchResult>, SearchError> {
        self.next().await
    }
}
