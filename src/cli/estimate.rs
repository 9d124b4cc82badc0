//! Pre-submission cost estimate.

use std::io::{self, Write};

use scholardraft::revision::estimate_tokens;
use scholardraft::ScholarDraftConfig;

use super::context::build_session;
use super::input::read_input;
use super::output::io_error;
use super::CliError;

/// Prints the estimated cost of revising the configured input.
///
/// # Errors
///
/// Returns [`CliError`] when input cannot be read or the session cannot be
/// built.
pub fn run(config: &ScholarDraftConfig) -> Result<(), CliError> {
    let text = read_input(config)?;
    let session = build_session(config)?;
    let estimate = session.estimate_submission_cost(&text);
    writeln!(
        io::stdout().lock(),
        "Estimated cost with {}: ${estimate:.4} (about {} tokens each way)",
        session.settings().selected_model,
        estimate_tokens(&text)
    )
    .map_err(|e| io_error(&e))
}
