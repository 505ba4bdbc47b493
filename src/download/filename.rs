//! Target filename derivation and sanitization for downloads.
//!
//! The derived name doubles as the duplicate key: a candidate whose derived
//! name already exists in the output directory is not downloaded again.

use std::path::{Component, Path};

use rand::Rng;
use url::Url;

/// Derives the local filename for `url`.
///
/// Uses the last non-empty path segment (percent-decoded, sanitized) when it
/// ends in `.extension`. Otherwise synthesizes `{host}_{counter}.{extension}`.
/// `extension` must already be normalized (no dot, lowercase).
#[must_use]
pub fn derive_target_name(url: &str, extension: &str, counter: usize) -> String {
    let parsed = Url::parse(url.trim()).ok();
    if let Some(name) = parsed.as_ref().and_then(|u| name_from_path(u, extension)) {
        return name;
    }

    let host = parsed
        .as_ref()
        .and_then(|u| u.host_str().map(|h| sanitize_filename_component(&h.replace('.', "-"))))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "download".to_string());
    format!("{host}_{counter}.{extension}")
}

fn name_from_path(url: &Url, extension: &str) -> Option<String> {
    let last = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(last)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| last.to_string());
    let name = sanitize_filename(&decoded);

    let suffix = format!(".{extension}");
    let lower = name.to_lowercase();
    if lower.len() > suffix.len() && lower.ends_with(&suffix) && !name.starts_with('.') {
        Some(name)
    } else {
        None
    }
}

/// Hidden, randomized temp name used while a transfer is in flight.
///
/// Never ends in the target extension, so it can't be mistaken for a finished
/// download by the duplicate check.
#[must_use]
pub(crate) fn temp_file_name(final_name: &str) -> String {
    let token: u32 = rand::thread_rng().r#gen();
    format!(".{final_name}.{token:08x}.part")
}

/// True when a `Content-Type` header value denotes an HTML document.
#[must_use]
pub(crate) fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    matches!(mime.as_str(), "text/html" | "application/xhtml+xml")
}

/// Sanitizes a filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Collapses anything outside `[alnum - _ .]` into single underscores.
pub(crate) fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in value.chars() {
        let mapped = if ch.is_alphanumeric() || matches!(ch, '-' | '.') {
            ch
        } else {
            '_'
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }
    out.trim_matches('_').to_string()
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
