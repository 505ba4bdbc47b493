//! Credential configuration: merge CLI values, the saved file, and an interactive prompt.

use std::io::{self, BufRead, IsTerminal, Write};

use sitefetch_core::{CredentialError, CredentialField, CredentialStore, Credentials, resolve_credentials};
use tracing::{info, warn};

use crate::cli::Args;

/// Resolves credentials for this run and saves them when `--save-credentials` is set.
///
/// Prompts on the terminal only when stdin is interactive; otherwise a missing
/// field is a configuration error.
pub(crate) fn resolve_config(args: &Args) -> Result<Credentials, CredentialError> {
    let store = CredentialStore::new(&args.credentials_file);
    let saved = store.load();
    let interactive = io::stdin().is_terminal();

    let credentials = resolve_credentials(
        args.api_key.clone(),
        args.search_engine_id.clone(),
        saved,
        |field| {
            if !interactive {
                return Ok(None);
            }
            let stdin = io::stdin();
            prompt_field(field, &mut stdin.lock(), &mut io::stderr())
        },
    )?;

    if args.save_credentials {
        save_credentials(&store, &credentials);
    }
    Ok(credentials)
}

/// Writes credentials; failure is logged and does not stop the run.
pub(crate) fn save_credentials(store: &CredentialStore, credentials: &Credentials) {
    match store.save(credentials) {
        Ok(()) => info!(path = %store.path().display(), "Credentials saved"),
        Err(error) => warn!(error = %error, "Could not save credentials"),
    }
}

/// Asks for one credential field. End of input yields `Ok(None)`.
pub(crate) fn prompt_field<R, W>(
    field: CredentialField,
    reader: &mut R,
    writer: &mut W,
) -> Result<Option<String>, CredentialError>
where
    R: BufRead,
    W: Write,
{
    let label = field.label();
    write!(writer, "Enter your {label} (see {}): ", field.help_url())
        .and_then(|()| writer.flush())
        .map_err(|e| CredentialError::prompt(label, e))?;

    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| CredentialError::prompt(label, e))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
