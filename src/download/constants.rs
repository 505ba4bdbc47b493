//! Constants for the download module (timeouts, pacing).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default pause between network downloads when run from the CLI, in milliseconds.
pub const DEFAULT_DOWNLOAD_DELAY_MS: u64 = 1000;
