//! Error types for credential persistence and resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while saving or resolving search API credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential file could not be written.
    #[error("failed to write credentials to {path}: {source}")]
    Write {
        /// Target credential file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Credentials could not be serialized.
    #[error("failed to encode credentials: {0}")]
    Encode(#[from] serde_json::Error),

    /// A required credential is missing or blank after every source was consulted.
    #[error("missing {field}")]
    Missing {
        /// Human-readable name of the missing field.
        field: &'static str,
    },

    /// Reading an interactively prompted value failed.
    #[error("failed to read {field} from terminal: {source}")]
    Prompt {
        /// Human-readable name of the prompted field.
        field: &'static str,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl CredentialError {
    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a missing-field error.
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::Missing { field }
    }

    /// Creates a prompt error.
    #[must_use]
    pub fn prompt(field: &'static str, source: std::io::Error) -> Self {
        Self::Prompt { field, source }
    }

    /// Returns true when the error means the run cannot start (no usable credentials).
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Missing { .. } | Self::Prompt { .. })
    }
}
