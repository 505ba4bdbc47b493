//! CLI entry point for the sitefetch tool.

use std::process::ExitCode;

use clap::Parser;
use sitefetch_core::{CredentialError, DEFAULT_CREDENTIALS_FILE, SearchError};

mod app;
mod cli;
mod output;

use cli::Args;

/// Process outcome, mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// At least one file downloaded or already present.
    Success,
    /// Nothing downloaded and nothing skipped.
    NothingAchieved,
    /// Configuration or search API error.
    Fatal,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::NothingAchieved => 1,
            Self::Fatal => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match app::runtime::run_sitefetch(args).await {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(error) => {
            eprintln!("error: {error:#}");
            if let Some(hint) = fatal_hint(&error) {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(ProcessExit::Fatal.code())
        }
    }
}

fn fatal_hint(error: &anyhow::Error) -> Option<String> {
    if let Some(search_error) = error.downcast_ref::<SearchError>() {
        return search_error.hint().map(ToString::to_string);
    }
    if let Some(credential_error) = error.downcast_ref::<CredentialError>()
        && credential_error.is_configuration_error()
    {
        return Some(format!(
            "pass --api-key and --search-engine-id, or save them to {DEFAULT_CREDENTIALS_FILE} with --save-credentials"
        ));
    }
    None
}
