//! Integration tests for the search client against a mock search API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use sitefetch_core::{Credentials, RetryPolicy, SearchClient, SearchError, Sleeper};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        mock_server
    }};
}

/// Sleeper that records requested delays instead of waiting.
#[derive(Debug, Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

fn page(links: &[String]) -> Value {
    let items: Vec<Value> = links
        .iter()
        .map(|link| json!({"link": link, "title": format!("Title of {link}")}))
        .collect();
    json!({"kind": "customsearch#search", "items": items})
}

fn links(range: std::ops::Range<usize>) -> Vec<String> {
    range
        .map(|i| format!("https://example.com/doc{i}.pdf"))
        .collect()
}

fn client(mock_server: &MockServer) -> SearchClient {
    SearchClient::with_base_url(
        Credentials::new("test-key", "test-cx"),
        &format!("{}/customsearch/v1", mock_server.uri()),
    )
    .expect("client should build")
}

async fn collect_urls(
    pager: &mut sitefetch_core::SearchPager<'_>,
) -> Result<Vec<String>, SearchError> {
    let mut urls = Vec::new();
    while let Some(result) = pager.next().await? {
        urls.push(result.url);
    }
    Ok(urls)
}

#[tokio::test]
async fn test_search_sends_query_and_credentials() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "test-key"))
        .and(query_param("cx", "test-cx"))
        .and(query_param("q", "filetype:pdf site:example.com"))
        .and(query_param("num", "10"))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&links(0..2))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut pager = client.search("example.com", ".PDF", 10);
    let urls = collect_urls(&mut pager).await.unwrap();

    assert_eq!(urls, links(0..2));
    assert_eq!(pager.pages_fetched(), 1);
}

#[tokio::test]
async fn test_search_paginates_and_dedups_across_pages() {
    let mock_server = require_mock_server!();

    let mut first = links(0..10);
    first[9] = first[0].clone();
    let mut second = links(10..13);
    second.push(first[1].clone());

    Mock::given(method("GET"))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&first)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("start", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&second)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut pager = client.search("example.com", "pdf", 50);
    let urls = collect_urls(&mut pager).await.unwrap();

    let mut expected = links(0..9);
    expected.extend(links(10..13));
    assert_eq!(urls, expected, "duplicates must be yielded once, in API order");
    assert_eq!(pager.pages_fetched(), 2);
}

#[tokio::test]
async fn test_search_stops_at_max_results_without_fetching_more_pages() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&links(0..10))))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("start", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&links(10..20))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut pager = client.search("example.com", "pdf", 3);
    let urls = collect_urls(&mut pager).await.unwrap();

    assert_eq!(urls, links(0..3));
    assert_eq!(pager.yielded(), 3);
}

#[tokio::test]
async fn test_search_empty_response_ends_sequence() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"kind": "customsearch#search"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut pager = client.search("example.com", "pdf", 10);

    assert!(pager.next().await.unwrap().is_none());
    assert!(pager.next().await.unwrap().is_none(), "pager must stay exhausted");
}

#[tokio::test]
async fn test_search_uses_metatag_when_link_is_landing_page() {
    let mock_server = require_mock_server!();
    let body = json!({
        "items": [
            {
                "link": "https://example.com/papers/42",
                "pagemap": {"metatags": [{"citation_pdf_url": "https://example.com/papers/42.pdf"}]}
            },
            {"link": "https://example.com/about"}
        ]
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut pager = client.search("example.com", "pdf", 10);
    let urls = collect_urls(&mut pager).await.unwrap();

    assert_eq!(urls, vec!["https://example.com/papers/42.pdf".to_string()]);
}

#[tokio::test]
async fn test_search_rate_limit_fails_immediately_with_single_request() {
    for status in [403u16, 429] {
        let mock_server = require_mock_server!();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": status, "message": "Quota exceeded for quota metric 'Queries'"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client(&mock_server).with_sleeper(sleeper.clone());
        let mut pager = client.search("example.com", "pdf", 10);

        match pager.next().await {
            Err(SearchError::RateLimited {
                status: got,
                message,
            }) => {
                assert_eq!(got, status);
                assert_eq!(
                    message.as_deref(),
                    Some("Quota exceeded for quota metric 'Queries'")
                );
            }
            other => panic!("Expected RateLimited, got: {other:?}"),
        }
        assert!(sleeper.recorded().is_empty(), "rate limits must not be retried");
        assert!(pager.next().await.unwrap().is_none(), "pager fused after error");
    }
}

#[tokio::test]
async fn test_search_invalid_request_carries_api_message() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut pager = client.search("example.com", "pdf", 10);

    match pager.next().await {
        Err(SearchError::InvalidRequest { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("Expected InvalidRequest, got: {other:?}"),
    }
}

/// Responder that fails the first `fail_count` requests with 500, then returns a page.
struct FlakyResponder {
    request_count: Arc<AtomicUsize>,
    fail_count: usize,
    body: Value,
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let n = self.request_count.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_count {
            ResponseTemplate::new(500).set_body_string("backend error")
        } else {
            ResponseTemplate::new(200).set_body_json(self.body.clone())
        }
    }
}

#[tokio::test]
async fn test_search_server_errors_retried_then_succeed() {
    let mock_server = require_mock_server!();
    let request_count = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .respond_with(FlakyResponder {
            request_count: Arc::clone(&request_count),
            fail_count: 2,
            body: page(&links(0..1)),
        })
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client(&mock_server).with_sleeper(sleeper.clone());
    let mut pager = client.search("example.com", "pdf", 10);
    let urls = collect_urls(&mut pager).await.unwrap();

    assert_eq!(urls, links(0..1));
    assert_eq!(request_count.load(Ordering::SeqCst), 3);
    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_secs(1), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_search_persistent_server_error_is_transient_after_retries() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = client(&mock_server).with_sleeper(sleeper.clone());
    let mut pager = client.search("example.com", "pdf", 10);

    match pager.next().await {
        Err(SearchError::Transient { attempts, reason }) => {
            assert_eq!(attempts, 3);
            assert!(reason.contains("503"), "Unexpected reason: {reason}");
        }
        other => panic!("Expected Transient, got: {other:?}"),
    }
    assert_eq!(sleeper.recorded().len(), 2);
}

#[tokio::test]
async fn test_search_custom_retry_policy_is_honored() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).with_retry_policy(RetryPolicy::no_retry());
    let mut pager = client.search("example.com", "pdf", 10);

    assert!(matches!(
        pager.next().await,
        Err(SearchError::Transient { attempts: 1, .. })
    ));
}

#[tokio::test]
async fn test_search_malformed_body_is_fatal() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let mut pager = client.search("example.com", "pdf", 10);

    assert!(matches!(
        pager.next().await,
        Err(SearchError::MalformedResponse { .. })
    ));
}
