//! Progress UI (spinner) for download runs.

use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use sitefetch_core::{OutcomeStatus, ProgressEvent, ProgressSink};
use url::Url;

/// Spinner on stderr showing `[current/target]`, the host, and bytes received.
///
/// Disabled sinks ignore every event; tracing output covers non-interactive runs.
pub(crate) struct CliProgress {
    spinner: Option<ProgressBar>,
    target: usize,
    current: usize,
    host: String,
    bytes: u64,
    content_length: Option<u64>,
}

impl CliProgress {
    pub(crate) fn new(use_spinner: bool, target: usize) -> Self {
        let spinner = use_spinner.then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner.set_message(format!("[0/{target}] Searching..."));
            spinner
        });
        Self {
            spinner,
            target,
            current: 0,
            host: String::new(),
            bytes: 0,
            content_length: None,
        }
    }

    pub(crate) fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }

    fn transfer_message(&self) -> String {
        let position = (self.current + 1).min(self.target);
        let received = HumanBytes(self.bytes);
        match self.content_length {
            Some(total) => format!(
                "[{position}/{}] Downloading from {}... {received} / {}",
                self.target,
                self.host,
                HumanBytes(total)
            ),
            None => format!(
                "[{position}/{}] Downloading from {}... {received}",
                self.target, self.host
            ),
        }
    }
}

impl ProgressSink for CliProgress {
    fn transfer_started(&mut self, url: &str, content_length: Option<u64>) {
        self.host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string))
            .unwrap_or_else(|| "server".to_string());
        self.bytes = 0;
        self.content_length = content_length;
        if let Some(spinner) = &self.spinner {
            spinner.set_message(self.transfer_message());
        }
    }

    fn bytes_received(&mut self, bytes: u64) {
        self.bytes = self.bytes.saturating_add(bytes);
        if let Some(spinner) = &self.spinner {
            spinner.set_message(self.transfer_message());
        }
    }

    fn item_finished(&mut self, event: &ProgressEvent<'_>) {
        self.current = event.current;
        let Some(spinner) = &self.spinner else {
            return;
        };
        let name = event
            .outcome
            .local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| event.outcome.url.clone());
        let line = match &event.outcome.status {
            OutcomeStatus::Downloaded { bytes } => {
                format!("Downloaded {name} ({})", HumanBytes(*bytes))
            }
            OutcomeStatus::SkippedDuplicate => format!("Skipped {name} (already exists)"),
            OutcomeStatus::Failed { reason } => format!("Failed {}: {reason}", event.outcome.url),
        };
        spinner.println(line);
        spinner.set_message(format!("[{}/{}] Searching...", event.current, event.target));
    }
}
