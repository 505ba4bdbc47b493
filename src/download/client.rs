//! HTTP client wrapper for downloading files.
//!
//! Bodies are streamed into a hidden temp file next to the destination and
//! renamed into place only after the whole body arrived, so a failed or
//! interrupted transfer never leaves a file under the final name.

use std::path::Path;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::filename::{is_html_content_type, temp_file_name};
use super::progress::ProgressSink;
use crate::user_agent::{self, BROWSER_USER_AGENT};

/// Extensions for which an HTML response is the expected payload.
const HTML_EXTENSIONS: [&str; 3] = ["html", "htm", "xhtml"];

/// HTTP client for downloading files with streaming support.
///
/// Created once per run and reused for every candidate, taking advantage of
/// connection pooling.
///
/// # Example
///
/// ```no_run
/// use sitefetch_core::download::{HttpClient, NoProgress};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let bytes = client
///     .download_to_path(
///         "https://example.com/file.pdf",
///         Path::new("./downloads/file.pdf"),
///         "pdf",
///         &mut NoProgress,
///     )
///     .await?;
/// println!("Downloaded {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes (for large files)
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the client cannot be built.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_download_user_agent())
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Downloads `url` to exactly `final_path`, returning the bytes written.
    ///
    /// The body is written to a temp file in the same directory and renamed
    /// to `final_path` after it was fully received, flushed and synced. On
    /// any error the temp file is removed and `final_path` is left untouched.
    ///
    /// `extension` (normalized) is used to reject HTML pages served in place
    /// of the requested file type.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout, interrupted body)
    /// - The server returns an error status, an empty body, or an HTML page
    /// - The body is shorter or longer than the declared `Content-Length`
    /// - Writing or renaming on disk fails
    #[instrument(skip_all, fields(url = %url))]
    pub async fn download_to_path(
        &self,
        url: &str,
        final_path: &Path,
        extension: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<u64, DownloadError> {
        debug!("starting download");
        let parsed_url =
            Url::parse(url).map_err(|_| DownloadError::invalid_url(url.to_string()))?;

        let response = match self.send_request(parsed_url.clone(), None).await {
            Err(error) if error.status() == Some(403) => {
                debug!("HTTP 403 with default user agent, retrying with browser user agent");
                self.send_request(parsed_url, Some(BROWSER_USER_AGENT))
                    .await?
            }
            other => other?,
        };

        if !HTML_EXTENSIONS.contains(&extension)
            && let Some(content_type) = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
            && is_html_content_type(content_type)
        {
            return Err(DownloadError::unexpected_html(url, extension));
        }

        let content_length = response.content_length();
        progress.transfer_started(url, content_length);

        let owned_url = url.to_string();
        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| DownloadError::network(owned_url.clone(), e)));

        let bytes = persist_stream(stream, final_path, content_length, url, progress).await?;
        info!(path = %final_path.display(), bytes, "download complete");
        Ok(bytes)
    }

    async fn send_request(
        &self,
        url: Url,
        user_agent: Option<&str>,
    ) -> Result<reqwest::Response, DownloadError> {
        let url_text = url.to_string();
        let mut request = self.client.get(url);
        if let Some(ua) = user_agent {
            request = request.header(USER_AGENT, ua);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(&url_text)
            } else {
                DownloadError::network(&url_text, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url_text, status.as_u16()));
        }
        Ok(response)
    }
}

/// Writes `stream` to a temp file beside `final_path`, then renames it into place.
///
/// The rename happens only when the stream ended cleanly, was non-empty, and
/// matched `expected_len` when one was declared. Every failure path removes
/// the temp file.
pub(crate) async fn persist_stream<S, B>(
    stream: S,
    final_path: &Path,
    expected_len: Option<u64>,
    url: &str,
    progress: &mut dyn ProgressSink,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, DownloadError>>,
    B: AsRef<[u8]>,
{
    let directory = final_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let final_name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            DownloadError::io(
                final_path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing file name"),
            )
        })?;
    let temp_path = directory.join(temp_file_name(&final_name));

    let outcome = async {
        let written = write_stream(stream, &temp_path, progress).await?;
        if written == 0 {
            return Err(DownloadError::empty_body(url));
        }
        if let Some(expected) = expected_len
            && expected != written
        {
            return Err(DownloadError::integrity(url, expected, written));
        }
        tokio::fs::rename(&temp_path, final_path)
            .await
            .map_err(|e| DownloadError::io(final_path, e))?;
        Ok(written)
    }
    .await;

    if outcome.is_err() {
        debug!(path = %temp_path.display(), "removing temp file after failed transfer");
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    outcome
}

async fn write_stream<S, B>(
    stream: S,
    temp_path: &Path,
    progress: &mut dyn ProgressSink,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, DownloadError>>,
    B: AsRef<[u8]>,
{
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .await
        .map_err(|e| DownloadError::io(temp_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;
    let mut stream = std::pin::pin!(stream);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        writer
            .write_all(chunk)
            .await
            .map_err(|e| DownloadError::io(temp_path, e))?;
        bytes_written += chunk.len() as u64;
        progress.bytes_received(chunk.len() as u64);
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(temp_path, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| DownloadError::io(temp_path, e))?;

    Ok(bytes_written)
}
