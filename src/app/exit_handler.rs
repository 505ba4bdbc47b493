//! Exit code logic for the sitefetch process.
//!
//! Single responsibility: map the run summary to the process exit outcome.

use crate::ProcessExit;

/// Determines the exit outcome of a run that finished without a fatal error.
///
/// Success when at least one file was downloaded or already present.
pub(crate) fn determine_exit_outcome(downloaded: usize, skipped: usize) -> ProcessExit {
    if downloaded > 0 || skipped > 0 {
        ProcessExit::Success
    } else {
        ProcessExit::NothingAchieved
    }
}
