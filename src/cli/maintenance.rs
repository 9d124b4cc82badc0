//! Mode listing, totals reset, and draft backup display.

use std::io::{self, Write};

use scholardraft::ScholarDraftConfig;

use super::context::build_session;
use super::output::{io_error, write_backup_to, write_modes_to, write_totals_to};
use super::CliError;

/// Lists built-in and custom modes, marking the selected one.
///
/// # Errors
///
/// Returns [`CliError`] when the session cannot be built or output fails.
pub fn list_modes(config: &ScholarDraftConfig) -> Result<(), CliError> {
    let session = build_session(config)?;
    let modes = session.mode_catalog().modes();
    write_modes_to(
        &mut io::stdout().lock(),
        &modes,
        &session.settings().selected_mode,
    )
}

/// Zeroes the running totals.
///
/// # Errors
///
/// Returns [`CliError`] when settings cannot be saved.
pub fn reset_stats(config: &ScholarDraftConfig) -> Result<(), CliError> {
    let mut session = build_session(config)?;
    session.reset_stats()?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Statistics reset.").map_err(|e| io_error(&e))?;
    write_totals_to(&mut stdout, session.settings())
}

/// Prints the draft backup left by a failed revision.
///
/// # Errors
///
/// Returns [`CliError`] when the backup cannot be read.
pub fn restore_backup(config: &ScholarDraftConfig) -> Result<(), CliError> {
    let session = build_session(config)?;
    let backup = session.latest_backup()?;
    write_backup_to(&mut io::stdout().lock(), backup.as_ref())
}
