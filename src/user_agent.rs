//! Shared User-Agent strings for search and download HTTP clients.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/sitefetch";

/// Browser User-Agent used as fallback when file hosts return 403.
///
/// Many hosts reject non-browser agents outright; the download client retries
/// once with this value before recording a failure.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default User-Agent for file downloads (identifies the tool).
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("sitefetch/{version} (file-download-tool; +{PROJECT_UA_URL})")
}

/// Default User-Agent for search API requests.
#[must_use]
pub(crate) fn default_search_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("sitefetch/{version} (search-client; +{PROJECT_UA_URL})")
}
