//! Progress reporting hooks for the download loop.

use super::DownloadOutcome;

/// Per-item progress snapshot, emitted after every candidate.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    /// Candidates processed so far in this run, including this one.
    pub current: usize,
    /// Number of downloads requested.
    pub target: usize,
    /// Outcome of the candidate just processed.
    pub outcome: &'a DownloadOutcome,
}

/// Receives progress from [`DownloadManager`](super::DownloadManager).
///
/// All calls happen synchronously on the download loop. Only
/// [`item_finished`](Self::item_finished) is required; any
/// `FnMut(&ProgressEvent)` closure is a sink.
pub trait ProgressSink {
    /// A transfer is about to stream its body. `content_length` is `None` when
    /// the server did not declare one.
    fn transfer_started(&mut self, _url: &str, _content_length: Option<u64>) {}

    /// `bytes` more bytes of the current transfer were written.
    fn bytes_received(&mut self, _bytes: u64) {}

    /// A candidate reached its final outcome.
    fn item_finished(&mut self, event: &ProgressEvent<'_>);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent<'_>),
{
    fn item_finished(&mut self, event: &ProgressEvent<'_>) {
        self(event);
    }
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn item_finished(&mut self, _event: &ProgressEvent<'_>) {}
}
