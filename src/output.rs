//! CLI output formatting and display helpers.

use std::path::Path;

use sitefetch_core::{DownloadSummary, OutcomeStatus};

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Message when the search produced no candidates at all.
pub fn no_results_line(domain: &str, extension: &str) -> String {
    format!("No .{extension} files found on {domain}.")
}

/// Builds the end-of-run summary lines.
pub fn summary_lines(summary: &DownloadSummary, directory: &Path, width: usize) -> Vec<String> {
    let mut lines = vec![
        "Download summary:".to_string(),
        format!("  Downloaded: {}", summary.downloaded()),
        format!("  Skipped (already present): {}", summary.skipped()),
        format!("  Failed: {}", summary.failed()),
    ];

    for outcome in summary.outcomes() {
        if let OutcomeStatus::Failed { reason } = &outcome.status {
            lines.push(truncate_to_width(&format!("    {reason}"), width));
        }
    }

    if summary.downloaded() > 0 {
        lines.push(format!("Files saved to {}", directory.display()));
    }
    lines
}

/// Prints the end-of-run summary to stdout.
pub fn print_summary(summary: &DownloadSummary, directory: &Path) {
    for line in summary_lines(summary, directory, terminal_width()) {
        println!("{line}");
    }
}
