//! Protection dictionary maintenance.

use std::io::{self, Write};

use scholardraft::ScholarDraftConfig;

use super::context::build_session;
use super::output::{io_error, write_terms_to};
use super::CliError;

/// Adds a protected term.
///
/// # Errors
///
/// Returns [`CliError`] when the term is blank or duplicate, or settings
/// cannot be saved.
pub fn add(
    config: &ScholarDraftConfig,
    term: &str,
    replacement: Option<String>,
) -> Result<(), CliError> {
    let mut session = build_session(config)?;
    session.add_term(term, replacement)?;
    writeln!(io::stdout().lock(), "Protected '{}'.", term.trim()).map_err(|e| io_error(&e))
}

/// Removes a protected term.
///
/// # Errors
///
/// Returns [`CliError`] when settings cannot be saved.
pub fn remove(config: &ScholarDraftConfig, term: &str) -> Result<(), CliError> {
    let mut session = build_session(config)?;
    let message = if session.remove_term(term)? {
        format!("Removed '{}'.", term.trim())
    } else {
        format!("'{}' was not protected.", term.trim())
    };
    writeln!(io::stdout().lock(), "{message}").map_err(|e| io_error(&e))
}

/// Lists the protected terms.
///
/// # Errors
///
/// Returns [`CliError`] when the session cannot be built or output fails.
pub fn list(config: &ScholarDraftConfig) -> Result<(), CliError> {
    let session = build_session(config)?;
    write_terms_to(&mut io::stdout().lock(), session.dictionary())
}
