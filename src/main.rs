//! ScholarDraft CLI entrypoint.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use scholardraft::{OperationMode, RevisionError, ScholarDraftConfig};
use tracing_subscriber::EnvFilter;

use cli::CliError;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "SCHOLARDRAFT_LOG";

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    let config = load_config()?;

    match config.operation_mode() {
        OperationMode::ListModes => cli::maintenance::list_modes(&config),
        OperationMode::SetApiKey(key) => cli::credentials::set(&config, &key),
        OperationMode::DeleteApiKey => cli::credentials::delete(&config),
        OperationMode::VerifyApiKey => cli::credentials::verify(&config),
        OperationMode::AddTerm { term, replacement } => {
            cli::dictionary::add(&config, &term, replacement)
        }
        OperationMode::RemoveTerm(term) => cli::dictionary::remove(&config, &term),
        OperationMode::ListTerms => cli::dictionary::list(&config),
        OperationMode::ResetStats => cli::maintenance::reset_stats(&config),
        OperationMode::RestoreBackup => cli::maintenance::restore_backup(&config),
        OperationMode::EstimateOnly => cli::estimate::run(&config),
        OperationMode::Revise => cli::revise::run(&config),
    }
}

/// Installs a stderr subscriber filtered by `SCHOLARDRAFT_LOG`, defaulting
/// to warnings only.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("a global subscriber was already installed");
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`RevisionError::Configuration`] when ortho-config fails to
/// parse arguments or load configuration files.
fn load_config() -> Result<ScholarDraftConfig, CliError> {
    ScholarDraftConfig::load()
        .map_err(|error| CliError::from(RevisionError::configuration(error.to_string())))
}
