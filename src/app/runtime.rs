use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::Result;
use sitefetch_core::search::normalize_extension;
use sitefetch_core::{DownloadManager, HttpClient, SearchClient};
use tracing::{debug, info};

use crate::app::{config_manager, exit_handler, progress_manager::CliProgress, terminal};
use crate::cli::Args;
use crate::{ProcessExit, output};

/// Runs one search-and-download pass.
///
/// Returns `Err` for fatal configuration and search errors; the summary is
/// printed before a search error is returned when any candidate was processed.
pub(crate) async fn run_sitefetch(args: Args) -> Result<ProcessExit> {
    let default_level = terminal::resolve_default_log_level(args.quiet, args.verbose);
    terminal::init_tracing(default_level, terminal::is_no_color_requested());

    debug!(?args, "CLI arguments parsed");
    info!(domain = %args.domain, extension = %args.extension, "Sitefetch starting");

    let credentials = config_manager::resolve_config(&args)?;

    let search_client = SearchClient::with_base_url(credentials, &args.search_endpoint)?;
    let manager = DownloadManager::new(HttpClient::new()?, &args.directory, &args.extension)
        .with_delay(Duration::from_millis(args.delay));

    let target = usize::try_from(args.number).unwrap_or(usize::MAX);
    let mut pager = search_client.search(&args.domain, &args.extension, target);

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let mut progress = CliProgress::new(use_spinner, target);
    let mut summary = manager.download_all(&mut pager, target, &mut progress).await;
    progress.finish();

    debug!(pages = pager.pages_fetched(), "search pages requested");

    if let Some(error) = summary.take_search_error() {
        if summary.attempted() > 0 {
            output::print_summary(&summary, &args.directory);
        }
        return Err(error.into());
    }

    if summary.attempted() == 0 {
        println!(
            "{}",
            output::no_results_line(&args.domain, &normalize_extension(&args.extension))
        );
        return Ok(ProcessExit::NothingAchieved);
    }

    output::print_summary(&summary, &args.directory);
    Ok(exit_handler::determine_exit_outcome(
        summary.downloaded(),
        summary.skipped(),
    ))
}
