//! Error types for the download module.
//!
//! Each variant carries the URL or path it concerns, so a failed candidate can
//! be reported in the run summary without extra context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading a single file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS, body interrupted).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create, write, rename).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Received body size does not match the server's declared content length.
    #[error("incomplete transfer from {url}: expected {expected_bytes} bytes, got {actual_bytes}")]
    Integrity {
        /// The URL being downloaded.
        url: String,
        /// Declared size in bytes.
        expected_bytes: u64,
        /// Bytes actually received.
        actual_bytes: u64,
    },

    /// The server answered with an empty body.
    #[error("empty response body from {url}")]
    EmptyBody {
        /// The URL being downloaded.
        url: String,
    },

    /// The server answered with an HTML page where a file was expected.
    #[error("{url} returned an HTML page instead of a .{extension} file")]
    UnexpectedHtml {
        /// The URL being downloaded.
        url: String,
        /// The requested extension.
        extension: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(url: impl Into<String>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            url: url.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates an empty-body error.
    pub fn empty_body(url: impl Into<String>) -> Self {
        Self::EmptyBody { url: url.into() }
    }

    /// Creates an unexpected-HTML error.
    pub fn unexpected_html(url: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::UnexpectedHtml {
            url: url.into(),
            extension: extension.into(),
        }
    }

    /// Returns the HTTP status for status errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the URL
// or path, which the source errors don't carry. Use the constructors.
