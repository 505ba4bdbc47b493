//! Sequential download loop with duplicate detection.
//!
//! # Example
//!
//! ```no_run
//! use sitefetch_core::download::{DownloadManager, HttpClient, NoProgress};
//! use sitefetch_core::CandidateList;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = DownloadManager::new(HttpClient::new()?, "./downloads", "pdf");
//! let mut candidates = CandidateList::from_urls(["https://example.com/a.pdf"]);
//! let summary = manager.download_all(&mut candidates, 1, &mut NoProgress).await;
//! println!("Downloaded: {}, Skipped: {}", summary.downloaded(), summary.skipped());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::HttpClient;
use super::filename::derive_target_name;
use super::progress::{ProgressEvent, ProgressSink};
use crate::retry::{Sleeper, TokioSleeper};
use crate::search::{CandidateSource, SearchError, normalize_extension};

/// Final state of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The file was fetched and stored under its final name.
    Downloaded {
        /// Bytes written.
        bytes: u64,
    },
    /// A file with the derived name already existed; no request was made.
    SkippedDuplicate,
    /// The transfer failed; nothing was stored under the final name.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

/// What happened to one candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Candidate URL.
    pub url: String,
    /// Destination path (existing, written, or intended).
    pub local_path: PathBuf,
    /// Result for this candidate.
    pub status: OutcomeStatus,
}

/// Aggregate result of [`DownloadManager::download_all`].
#[derive(Debug, Default)]
pub struct DownloadSummary {
    outcomes: Vec<DownloadOutcome>,
    search_error: Option<SearchError>,
}

impl DownloadSummary {
    /// Per-candidate outcomes in processing order.
    #[must_use]
    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    /// Number of files downloaded.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Downloaded { .. }))
    }

    /// Number of candidates skipped as duplicates.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::SkippedDuplicate))
    }

    /// Number of failed candidates.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed { .. }))
    }

    /// Number of candidates processed (downloaded + skipped + failed).
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Total bytes written across all downloads.
    #[must_use]
    pub fn bytes_downloaded(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                OutcomeStatus::Downloaded { bytes } => bytes,
                _ => 0,
            })
            .sum()
    }

    /// The search error that ended the run early, if any.
    #[must_use]
    pub fn search_error(&self) -> Option<&SearchError> {
        self.search_error.as_ref()
    }

    /// Takes ownership of the search error, leaving `None`.
    pub fn take_search_error(&mut self) -> Option<SearchError> {
        self.search_error.take()
    }

    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

/// Downloads candidates one at a time into a single directory.
///
/// A candidate whose derived file name already exists is skipped without a
/// request. Per-file failures are recorded and the loop continues; a search
/// error ends the loop and is kept in the summary.
#[derive(Debug)]
pub struct DownloadManager {
    client: HttpClient,
    directory: PathBuf,
    extension: String,
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl DownloadManager {
    /// Creates a manager writing `extension` files into `directory`.
    pub fn new(client: HttpClient, directory: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            client,
            directory: directory.into(),
            extension: normalize_extension(extension),
            delay: Duration::ZERO,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Sets the pause between consecutive network downloads.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replaces the sleeper used for the pause between downloads.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Output directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Processes candidates until `target` files were downloaded, the source
    /// is exhausted, or the source reports an error.
    ///
    /// Candidates beyond the point where `target` is reached are not pulled
    /// from the source.
    #[instrument(skip(self, candidates, progress), fields(directory = %self.directory.display()))]
    pub async fn download_all<S>(
        &self,
        candidates: &mut S,
        target: usize,
        progress: &mut dyn ProgressSink,
    ) -> DownloadSummary
    where
        S: CandidateSource + ?Sized,
    {
        let mut summary = DownloadSummary::default();
        if target == 0 {
            return summary;
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.directory).await {
            warn!(error = %e, "could not create output directory");
        }

        let mut processed = 0usize;
        let mut network_downloads = 0usize;

        while summary.downloaded() < target {
            let candidate = match candidates.next_candidate().await {
                Ok(Some(candidate)) => candidate,
                Ok(None) => {
                    debug!("candidate source exhausted");
                    break;
                }
                Err(error) => {
                    warn!(error = %error, "search failed, stopping downloads");
                    summary.search_error = Some(error);
                    break;
                }
            };
            processed += 1;

            let name = derive_target_name(&candidate.url, &self.extension, processed);
            let local_path = self.directory.join(&name);

            let status = if is_existing_file(&local_path).await {
                info!(file = %name, "file already exists, skipping");
                OutcomeStatus::SkippedDuplicate
            } else {
                if network_downloads > 0 {
                    self.sleeper.sleep(self.delay).await;
                }
                network_downloads += 1;

                match self
                    .client
                    .download_to_path(&candidate.url, &local_path, &self.extension, progress)
                    .await
                {
                    Ok(bytes) => OutcomeStatus::Downloaded { bytes },
                    Err(error) => {
                        warn!(url = %candidate.url, error = %error, "download failed");
                        OutcomeStatus::Failed {
                            reason: error.to_string(),
                        }
                    }
                }
            };

            summary.outcomes.push(DownloadOutcome {
                url: candidate.url,
                local_path,
                status,
            });
            if let Some(outcome) = summary.outcomes.last() {
                progress.item_finished(&ProgressEvent {
                    current: processed,
                    target,
                    outcome,
                });
            }
        }

        info!(
            downloaded = summary.downloaded(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "download batch finished"
        );
        summary
    }
}

async fn is_existing_file(path: &Path) -> bool {
    matches!(tokio::fs::try_exists(path).await, Ok(true))
}
