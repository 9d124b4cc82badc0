//! Session construction from configuration.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use scholardraft::revision::{
    OpenAiCompletionClient, OpenAiCompletionConfig, PromptConfig, ThreadSleeper,
};
use scholardraft::session::{RevisionSession, SessionCollaborators};
use scholardraft::storage::{
    CredentialStore, FallbackCredentialStore, FileCredentialStore, JsonDraftBackupStore,
    JsonSettingsStore, KeychainCredentialStore, default_data_dir,
};
use scholardraft::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use scholardraft::ScholarDraftConfig;

use super::CliError;

/// Builds a session wired to the local stores and the configured endpoint.
///
/// The `--mode`, `--model`, and `--dialect` values, when present, are
/// applied and persisted as the new selections.
///
/// # Errors
///
/// Returns [`CliError`] when the data directory cannot be resolved, the
/// prompt document is invalid, or a selection is rejected.
pub fn build_session(config: &ScholarDraftConfig) -> Result<RevisionSession, CliError> {
    let data_dir = default_data_dir(config.data_dir().as_deref())?;
    let prompts = PromptConfig::load(config.prompts_path().as_deref())?;
    let credentials = credential_store(&data_dir);
    let api_key = config.resolve_api_key().or_else(|| stored_key(credentials.as_ref()));

    let endpoint = config.endpoint_url()?;
    let client = OpenAiCompletionClient::new(OpenAiCompletionConfig::new(
        endpoint.as_str(),
        api_key,
        config.timeout(),
    ));
    let collaborators = SessionCollaborators {
        settings_store: Arc::new(JsonSettingsStore::new(data_dir.clone())),
        credentials,
        backups: Arc::new(JsonDraftBackupStore::new(data_dir.clone())),
        client: Arc::new(client),
        sleeper: Arc::new(ThreadSleeper),
        telemetry: telemetry_sink(config.telemetry),
    };
    tracing::debug!(%data_dir, %endpoint, "building session");

    let mut session =
        RevisionSession::new(prompts, collaborators).with_pipeline_options(config.pipeline_options()?);
    apply_selections(&mut session, config)?;
    Ok(session)
}

/// Resolved data directory, for messages that point at stored files.
///
/// # Errors
///
/// Returns [`CliError`] when no data directory can be resolved.
pub fn data_dir(config: &ScholarDraftConfig) -> Result<Utf8PathBuf, CliError> {
    Ok(default_data_dir(config.data_dir().as_deref())?)
}

fn credential_store(data_dir: &Utf8Path) -> Arc<dyn CredentialStore> {
    let file: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(data_dir.to_path_buf()));
    match KeychainCredentialStore::open() {
        Ok(vault) => Arc::new(FallbackCredentialStore::new(Arc::new(vault), file)),
        Err(error) => {
            tracing::debug!(%error, "using the file credential store");
            file
        }
    }
}

fn stored_key(credentials: &dyn CredentialStore) -> Option<String> {
    match credentials.get() {
        Ok(key) => key,
        Err(error) => {
            tracing::warn!(%error, "failed to read the stored API key");
            None
        }
    }
}

fn telemetry_sink(enabled: bool) -> Arc<dyn TelemetrySink> {
    if enabled {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    }
}

fn apply_selections(
    session: &mut RevisionSession,
    config: &ScholarDraftConfig,
) -> Result<(), CliError> {
    if let Some(mode) = config.mode.as_deref() {
        session.select_mode(mode)?;
    }
    if let Some(model) = config.model.as_deref() {
        session.select_model(model)?;
    }
    if let Some(dialect) = config.dialect.as_deref() {
        session.select_dialect(dialect)?;
    }
    Ok(())
}
