//! API key management.

use std::io::{self, Write};

use scholardraft::storage::CredentialProtection;
use scholardraft::ScholarDraftConfig;

use super::context::{build_session, data_dir};
use super::output::io_error;
use super::CliError;

/// Validates and stores `key`.
///
/// # Errors
///
/// Returns [`CliError`] when the key is malformed or cannot be stored.
pub fn set(config: &ScholarDraftConfig, key: &str) -> Result<(), CliError> {
    let session = build_session(config)?;
    let protection = session.set_api_key(key)?;
    let mut stdout = io::stdout().lock();
    let written = match protection {
        CredentialProtection::Keychain => {
            writeln!(stdout, "API key saved in the system credential vault.")
        }
        CredentialProtection::OwnerOnly => writeln!(
            stdout,
            "API key saved in {} (readable by your user only).",
            data_dir(config)?
        ),
        CredentialProtection::Plaintext => writeln!(
            stdout,
            "API key saved in {} (stored in plain text).",
            data_dir(config)?
        ),
    };
    written.map_err(|e| io_error(&e))
}

/// Deletes the stored key.
///
/// # Errors
///
/// Returns [`CliError`] when the key file cannot be removed.
pub fn delete(config: &ScholarDraftConfig) -> Result<(), CliError> {
    build_session(config)?.delete_api_key()?;
    writeln!(io::stdout().lock(), "API key deleted.").map_err(|e| io_error(&e))
}

/// Checks the configured key against the completion endpoint.
///
/// # Errors
///
/// Returns [`CliError`] when the key is missing or rejected.
pub fn verify(config: &ScholarDraftConfig) -> Result<(), CliError> {
    build_session(config)?.verify_credentials()?;
    writeln!(io::stdout().lock(), "API key verified.").map_err(|e| io_error(&e))
}
