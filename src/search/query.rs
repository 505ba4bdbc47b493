//! Query construction and candidate extraction for search API pages.

use std::collections::HashMap;

use serde::Deserialize;

/// Metatag keys that may point at the file itself rather than a landing page.
const FILE_URL_METATAGS: [&str; 3] = ["og:url", "url", "citation_pdf_url"];

/// Normalizes a user-supplied extension: trimmed, no leading dot, lowercase.
#[must_use]
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

/// Builds the query string restricting results to `domain` and file type `extension`.
#[must_use]
pub fn build_query(domain: &str, extension: &str) -> String {
    format!(
        "filetype:{} site:{}",
        normalize_extension(extension),
        domain.trim()
    )
}

// ==================== Search API Response Types ====================

/// Top-level search API response; `items` is absent past the last page.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One result item.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchItem {
    pub link: Option<String>,
    pub title: Option<String>,
    pub pagemap: Option<PageMap>,
}

/// Structured data attached to an item.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PageMap {
    #[serde(default)]
    pub metatags: Vec<HashMap<String, serde_json::Value>>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: Option<String>,
}

/// Extracts the API's error message from a non-2xx body, if it has one.
pub(crate) fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

// ==================== Candidate Extraction ====================

/// Picks the URL of the file an item refers to, or `None` if it has none.
///
/// Order: a `link` ending in `.ext`; a file-like metatag ending in `.ext`;
/// a `link` that mentions `ext` anywhere (download pages with query strings).
/// `extension` must already be normalized.
pub(crate) fn candidate_url(item: &SearchItem, extension: &str) -> Option<String> {
    let suffix = format!(".{extension}");
    let link = item.link.as_deref().map(str::trim).filter(|l| !l.is_empty());

    if let Some(link) = link
        && link.to_lowercase().ends_with(&suffix)
    {
        return Some(link.to_string());
    }

    let metatag_hit = item
        .pagemap
        .iter()
        .flat_map(|pagemap| pagemap.metatags.iter())
        .flat_map(|metatag| {
            FILE_URL_METATAGS
                .iter()
                .filter_map(move |key| metatag.get(*key).and_then(serde_json::Value::as_str))
        })
        .map(str::trim)
        .find(|url| url.to_lowercase().ends_with(&suffix));
    if let Some(url) = metatag_hit {
        return Some(url.to_string());
    }

    link.filter(|l| l.to_lowercase().contains(extension))
        .map(ToString::to_string)
}
