//! Search API credentials and their on-disk store.
//!
//! Credentials are plain values handed to the search client; nothing here is
//! process-global. The store reads and writes a small JSON document:
//!
//! ```json
//! { "api_key": "...", "search_engine_id": "..." }
//! ```
//!
//! A missing or malformed file is never an error on load; callers fall back to
//! CLI values or an interactive prompt (see [`resolve_credentials`]).

mod error;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use error::CredentialError;

/// Fixed credential file name, relative to the working directory.
pub const DEFAULT_CREDENTIALS_FILE: &str = "google_api_config.json";

/// API key and search engine identifier for the search API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Search API key.
    pub api_key: String,
    /// Programmable search engine identifier (`cx`).
    pub search_engine_id: String,
}

impl Credentials {
    /// Creates credentials from the two required values.
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.search_engine_id.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("search_engine_id", &self.search_engine_id)
            .finish()
    }
}

/// Which credential field a prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    /// The search API key.
    ApiKey,
    /// The search engine identifier.
    SearchEngineId,
}

impl CredentialField {
    /// Human-readable field label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ApiKey => "API key",
            Self::SearchEngineId => "search engine ID",
        }
    }

    /// Where the user can obtain this value.
    #[must_use]
    pub fn help_url(self) -> &'static str {
        match self {
            Self::ApiKey => "https://console.cloud.google.com/apis/credentials",
            Self::SearchEngineId => "https://programmablesearchengine.google.com/",
        }
    }
}

/// Loads and saves [`Credentials`] at a fixed file path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::default_location()
    }
}

impl CredentialStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`DEFAULT_CREDENTIALS_FILE`] in the working directory.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(DEFAULT_CREDENTIALS_FILE)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads credentials, returning `None` when the file is absent, unreadable,
    /// malformed, or missing either field.
    #[must_use]
    pub fn load(&self) -> Option<Credentials> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved credentials");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read credential file");
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&raw) {
            Ok(credentials) if credentials.is_complete() => {
                debug!(path = %self.path.display(), "loaded saved credentials");
                Some(credentials)
            }
            Ok(_) => {
                warn!(path = %self.path.display(), "credential file has blank fields, ignoring");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "error parsing credential file, ignoring");
                None
            }
        }
    }

    /// Writes credentials, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when encoding or writing fails.
    pub fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        let mut encoded = serde_json::to_string_pretty(credentials)?;
        encoded.push('\n');
        fs::write(&self.path, encoded).map_err(|e| CredentialError::write(&self.path, e))?;
        debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }
}

/// Resolves credentials field by field.
///
/// Precedence: explicit values (CLI), then the saved file, then `prompt`.
/// Blank values count as absent. `prompt` returning `Ok(None)` or a blank
/// string yields [`CredentialError::Missing`].
///
/// # Errors
///
/// Returns [`CredentialError::Missing`] when a field is still absent after the
/// prompt, or the prompt's own error.
pub fn resolve_credentials<P>(
    api_key: Option<String>,
    search_engine_id: Option<String>,
    saved: Option<Credentials>,
    mut prompt: P,
) -> Result<Credentials, CredentialError>
where
    P: FnMut(CredentialField) -> Result<Option<String>, CredentialError>,
{
    let api_key = non_blank(api_key);
    let search_engine_id = non_blank(search_engine_id);

    let (saved_key, saved_id) = match saved {
        Some(saved) if api_key.is_none() || search_engine_id.is_none() => {
            debug!("using saved credentials for missing fields");
            (Some(saved.api_key), Some(saved.search_engine_id))
        }
        _ => (None, None),
    };

    let api_key = match api_key.or_else(|| non_blank(saved_key)) {
        Some(value) => value,
        None => prompt_field(&mut prompt, CredentialField::ApiKey)?,
    };
    let search_engine_id = match search_engine_id.or_else(|| non_blank(saved_id)) {
        Some(value) => value,
        None => prompt_field(&mut prompt, CredentialField::SearchEngineId)?,
    };

    Ok(Credentials {
        api_key,
        search_engine_id,
    })
}

fn prompt_field<P>(prompt: &mut P, field: CredentialField) -> Result<String, CredentialError>
where
    P: FnMut(CredentialField) -> Result<Option<String>, CredentialError>,
{
    non_blank(prompt(field)?).ok_or_else(|| CredentialError::missing(field.label()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
