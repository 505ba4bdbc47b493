//! CLI argument definitions using clap derive macros.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

/// Default number of files to download.
const DEFAULT_NUMBER: u32 = 10;

/// Find files of one type on a website through a search API and download them.
///
/// Sitefetch searches `site:<DOMAIN>` for `filetype:<EXTENSION>` results and
/// downloads up to `--number` of them, skipping files that already exist in
/// the output directory.
#[derive(Parser)]
#[command(name = "sitefetch")]
#[command(author, version, about)]
pub struct Args {
    /// Domain to search (e.g. example.com)
    pub domain: String,

    /// File extension to look for (e.g. pdf or .pdf)
    pub extension: String,

    /// Number of files to download (at least 1)
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUMBER, value_parser = clap::value_parser!(u32).range(1..))]
    pub number: u32,

    /// Directory to save downloaded files into (created if missing)
    #[arg(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,

    /// Search API key (overrides the saved credential file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Search engine ID (overrides the saved credential file)
    #[arg(long)]
    pub search_engine_id: Option<String>,

    /// Save the resolved credentials for future runs
    #[arg(long)]
    pub save_credentials: bool,

    /// Credential file to load from and save to
    #[arg(long, value_name = "PATH", default_value = sitefetch_core::DEFAULT_CREDENTIALS_FILE)]
    pub credentials_file: PathBuf,

    /// Delay between downloads in milliseconds (0 to disable, max 60000)
    #[arg(long, value_name = "MS", default_value_t = sitefetch_core::DEFAULT_DOWNLOAD_DELAY_MS, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Search API endpoint override
    #[arg(long, hide = true, env = "SITEFETCH_SEARCH_ENDPOINT", default_value = sitefetch_core::search::DEFAULT_SEARCH_ENDPOINT)]
    pub search_endpoint: String,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("domain", &self.domain)
            .field("extension", &self.extension)
            .field("number", &self.number)
            .field("directory", &self.directory)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("search_engine_id", &self.search_engine_id)
            .field("save_credentials", &self.save_credentials)
            .field("credentials_file", &self.credentials_file)
            .field("delay", &self.delay)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("search_endpoint", &self.search_endpoint)
            .finish()
    }
}
