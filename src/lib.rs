//! Sitefetch Core Library
//!
//! This library finds files of one type on one site through a web search API
//! and downloads them into a local directory, skipping files already present.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`credentials`] - API key and search engine ID, loaded from and saved to JSON
//! - [`search`] - Paged search queries yielding distinct candidate URLs
//! - [`download`] - Streaming, atomic file downloads and the sequential download loop
//! - [`retry`] - Fixed-delay retry policy and the injectable sleeper

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod credentials;
pub mod download;
pub mod retry;
pub mod search;
mod user_agent;

// Re-export commonly used types
pub use credentials::{
    CredentialError, CredentialField, CredentialStore, Credentials, DEFAULT_CREDENTIALS_FILE,
    resolve_credentials,
};
pub use download::{
    DEFAULT_DOWNLOAD_DELAY_MS, DownloadError, DownloadManager, DownloadOutcome, DownloadSummary,
    HttpClient, NoProgress, OutcomeStatus, ProgressEvent, ProgressSink,
};
pub use retry::{RetryDecision, RetryPolicy, Sleeper, TokioSleeper};
pub use search::{CandidateList, CandidateSource, SearchClient, SearchError, SearchPager, SearchResult};
pub use user_agent::BROWSER_USER_AGENT;
