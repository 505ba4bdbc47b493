//! Streaming downloads into a single output directory.
//!
//! This module turns candidate URLs into files on disk:
//!
//! - [`derive_target_name`] picks the local file name (also the duplicate key)
//! - [`HttpClient`] streams one body to a hidden temp file and renames it into
//!   place only after the transfer completed
//! - [`DownloadManager`] runs the sequential loop, skips existing files, and
//!   reports through a [`ProgressSink`]
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Structured error types with full context
//! - No partially written file ever appears under a final name
//!
//! # Example
//!
//! ```no_run
//! use sitefetch_core::download::{HttpClient, NoProgress};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let bytes = client
//!     .download_to_path(
//!         "https://example.com/paper.pdf",
//!         Path::new("./downloads/paper.pdf"),
//!         "pdf",
//!         &mut NoProgress,
//!     )
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod filename;
mod manager;
mod progress;

pub use client::HttpClient;
pub use constants::DEFAULT_DOWNLOAD_DELAY_MS;
pub use error::DownloadError;
pub use filename::derive_target_name;
pub use manager::{DownloadManager, DownloadOutcome, DownloadSummary, OutcomeStatus};
pub use progress::{NoProgress, ProgressEvent, ProgressSink};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
