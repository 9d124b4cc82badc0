//! Revision session: the context object owning settings, collaborators,
//! and per-session state.
//!
//! A session is created once at start-up. It loads settings, resolves
//! modes against the prompt configuration, runs revisions through the
//! retry-wrapped pipeline, and keeps the version history for display and
//! restore. One revision runs at a time.

use std::sync::Arc;

use chrono::Utc;

use crate::cost::{estimate_cost, estimate_submission_cost};
use crate::diff::{diff, render, word_presence};
use crate::history::{VersionEntry, VersionHistory};
use crate::revision::{
    CompletionClient, CustomMode, DEFAULT_MODE, Dictionary, ModeCatalog, PipelineInput,
    PipelineOptions, ProgressObserver, PromptConfig, RetryController, RetryPolicy, RevisionError,
    RevisionProgress, RevisionRequest, RevisionResult, Sleeper, SystemPromptBuilder, run_pipeline,
};
use crate::storage::{
    CredentialProtection, CredentialStore, DraftBackup, DraftBackupStore, Settings,
    SettingsStore, validate_api_key,
};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// External collaborators a session delegates to.
#[derive(Debug, Clone)]
pub struct SessionCollaborators {
    /// Settings persistence.
    pub settings_store: Arc<dyn SettingsStore>,
    /// API key persistence.
    pub credentials: Arc<dyn CredentialStore>,
    /// Draft backup persistence.
    pub backups: Arc<dyn DraftBackupStore>,
    /// Completion endpoint.
    pub client: Arc<dyn CompletionClient>,
    /// Backoff pauses between retries.
    pub sleeper: Arc<dyn Sleeper>,
    /// Telemetry destination.
    pub telemetry: Arc<dyn TelemetrySink>,
}

/// Forwards progress and records retries as telemetry.
struct TelemetryObserver<'a, O: ProgressObserver + ?Sized> {
    inner: &'a mut O,
    sink: &'a dyn TelemetrySink,
}

impl<O: ProgressObserver + ?Sized> ProgressObserver for TelemetryObserver<'_, O> {
    fn observe(&mut self, event: &RevisionProgress) {
        if let RevisionProgress::RetryScheduled {
            attempt,
            max_attempts,
            reason,
            ..
        } = event
        {
            self.sink.record(TelemetryEvent::RevisionRetried {
                attempt: *attempt,
                max_attempts: *max_attempts,
                reason: reason.clone(),
            });
        }
        self.inner.observe(event);
    }
}

/// Explicit application context replacing process-wide state.
#[derive(Debug)]
pub struct RevisionSession {
    prompts: PromptConfig,
    settings: Settings,
    collaborators: SessionCollaborators,
    retry: RetryController,
    options: PipelineOptions,
    history: VersionHistory,
    last_input: String,
}

impl RevisionSession {
    /// Creates a session, loading settings from the settings store.
    ///
    /// Missing or unreadable settings fall back to defaults; a read failure
    /// is logged rather than raised.
    #[must_use]
    pub fn new(prompts: PromptConfig, collaborators: SessionCollaborators) -> Self {
        let settings = match collaborators.settings_store.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(error) => {
                tracing::warn!(%error, "failed to load settings; using defaults");
                Settings::default()
            }
        };
        Self {
            prompts,
            settings,
            collaborators,
            retry: RetryController::new(RetryPolicy::default()),
            options: PipelineOptions::default(),
            history: VersionHistory::new(),
            last_input: String::new(),
        }
    }

    /// Replaces the chunking, token, and streaming options.
    #[must_use]
    pub const fn with_pipeline_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = RetryController::new(policy);
        self
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Prompt configuration in use.
    #[must_use]
    pub const fn prompt_config(&self) -> &PromptConfig {
        &self.prompts
    }

    /// Built-in and custom modes.
    #[must_use]
    pub fn mode_catalog(&self) -> ModeCatalog<'_> {
        ModeCatalog::new(&self.prompts, &self.settings.custom_modes)
    }

    /// Attempts made by the retry controller in the current run; zero
    /// between runs.
    #[must_use]
    pub const fn retry_attempts(&self) -> u32 {
        self.retry.attempts()
    }

    /// Builds a request for `text` from the current selections.
    #[must_use]
    pub fn build_request(&self, text: &str, latex_protect: bool) -> RevisionRequest {
        RevisionRequest::new(
            text,
            self.settings.selected_mode.as_str(),
            self.settings.selected_dialect.as_str(),
            self.settings.selected_model.as_str(),
        )
        .with_latex_protection(latex_protect)
    }

    /// Revises `request` end to end.
    ///
    /// Blank input is rejected before anything else happens. A source text
    /// that differs from the previous request starts a new document and
    /// clears the history; revising the same text again adds another
    /// version. A draft backup is then written and the pipeline runs under
    /// the retry controller. On success the result is added to the history,
    /// running totals are persisted, and the backup is removed.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] for blank input,
    /// [`RevisionError::Configuration`] for an unknown mode, and the
    /// pipeline's error otherwise; exhausted retries point at the backup.
    pub fn revise(
        &mut self,
        request: &RevisionRequest,
        observer: &mut dyn ProgressObserver,
    ) -> Result<RevisionResult, RevisionError> {
        let source = request.source_text().trim();
        if source.is_empty() {
            return Err(RevisionError::validation(
                "please enter some text to revise",
            ));
        }
        let mode = self.mode_catalog().resolve(request.mode())?;

        if self.last_input != source {
            self.start_document();
            source.clone_into(&mut self.last_input);
        }
        let backup_hint = self.save_backup(request, source);

        let system_prompt = SystemPromptBuilder::standard(
            &self.prompts,
            &mode,
            request.dialect(),
            request.latex_protect(),
        )
        .build();
        tracing::info!(
            mode = mode.id(),
            model = request.model(),
            chars = source.chars().count(),
            "starting revision"
        );

        let input = PipelineInput {
            text: source,
            system_prompt: &system_prompt,
            model: request.model(),
            temperature: mode.temperature(),
            dictionary: &self.settings.dictionary,
        };
        let client = self.collaborators.client.as_ref();
        let options = self.options;
        let mut tracked = TelemetryObserver {
            inner: observer,
            sink: self.collaborators.telemetry.as_ref(),
        };
        let outcome = self.retry.run(
            self.collaborators.sleeper.as_ref(),
            &mut tracked,
            |progress| run_pipeline(client, &input, options, progress),
        );

        let attempted = match outcome {
            Ok(attempted) => attempted,
            Err(error) => {
                let surfaced = error.with_backup_hint(backup_hint);
                tracing::warn!(error = %surfaced, "revision failed");
                self.collaborators
                    .telemetry
                    .record(TelemetryEvent::RevisionFailed {
                        mode: mode.id().to_owned(),
                        model: request.model().to_owned(),
                        error: surfaced.to_string(),
                    });
                return Err(surfaced);
            }
        };

        let polished = attempted.value.text;
        let cost = estimate_cost(
            source,
            &polished,
            request.model(),
            &self.prompts.cost_estimates,
        );
        self.history.push(polished.as_str(), source);
        self.settings.record_polish(cost);
        self.persist_quietly();
        if let Err(error) = self.collaborators.backups.delete() {
            tracing::warn!(%error, "failed to delete draft backup");
        }

        self.collaborators
            .telemetry
            .record(TelemetryEvent::RevisionCompleted {
                mode: mode.id().to_owned(),
                model: request.model().to_owned(),
                chunks: attempted.value.chunks,
                attempts: attempted.attempts,
                input_chars: source.chars().count(),
                output_chars: polished.chars().count(),
                cost_usd: cost,
            });
        tracing::info!(
            attempts = attempted.attempts,
            chunks = attempted.value.chunks,
            "revision completed"
        );

        Ok(RevisionResult {
            polished_text: polished,
            cost,
            timestamp: Utc::now(),
            attempts: attempted.attempts,
            chunks: attempted.value.chunks,
        })
    }

    /// Pre-submission cost estimate for `text` with the selected model.
    #[must_use]
    pub fn estimate_submission_cost(&self, text: &str) -> f64 {
        estimate_submission_cost(
            text,
            &self.settings.selected_model,
            &self.prompts.cost_estimates,
        )
    }

    /// Version history of the current document.
    #[must_use]
    pub const fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// Discards every version of the current document.
    ///
    /// The next revision starts a fresh history even when its text matches
    /// the previous request.
    pub fn start_document(&mut self) {
        self.history.clear();
        self.last_input.clear();
    }

    /// Makes the version at `index` current; `None` when out of bounds.
    pub fn restore_version(&mut self, index: usize) -> Option<&VersionEntry> {
        self.history.restore(index)
    }

    /// Diff markup for the current version.
    ///
    /// Versions without a recorded original fall back to word presence
    /// against the last submitted input.
    #[must_use]
    pub fn render_current_diff(&self) -> Option<String> {
        let entry = self.history.current()?;
        let ops = if entry.original.is_empty() {
            word_presence(&self.last_input, &entry.polished)
        } else {
            diff(&entry.original, &entry.polished)
        };
        Some(render(&ops))
    }

    /// Terms currently protected.
    #[must_use]
    pub const fn dictionary(&self) -> &Dictionary {
        &self.settings.dictionary
    }

    /// Adds a protected term and persists the dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] for a blank or duplicate term
    /// and [`RevisionError::Storage`] when settings cannot be saved.
    pub fn add_term(
        &mut self,
        term: &str,
        replacement: Option<String>,
    ) -> Result<(), RevisionError> {
        let mut staged = self.settings.clone();
        staged.dictionary.add(term.trim(), replacement)?;
        self.commit(staged)
    }

    /// Removes a protected term, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Storage`] when settings cannot be saved.
    pub fn remove_term(&mut self, term: &str) -> Result<bool, RevisionError> {
        let mut staged = self.settings.clone();
        if !staged.dictionary.remove(term.trim()) {
            return Ok(false);
        }
        self.commit(staged)?;
        Ok(true)
    }

    /// Selects the mode used for new requests.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] for an unknown mode and
    /// [`RevisionError::Storage`] when settings cannot be saved.
    pub fn select_mode(&mut self, id: &str) -> Result<(), RevisionError> {
        let mode = self.mode_catalog().resolve(id)?;
        let staged = Settings {
            selected_mode: mode.id().to_owned(),
            ..self.settings.clone()
        };
        self.commit(staged)
    }

    /// Selects the model used for new requests.
    ///
    /// Models without a pricing entry are accepted; their cost reads as 0.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] for a blank identifier and
    /// [`RevisionError::Storage`] when settings cannot be saved.
    pub fn select_model(&mut self, id: &str) -> Result<(), RevisionError> {
        let model = non_blank(id, "model")?;
        if self.prompts.cost_estimates.get(model).is_none() {
            tracing::warn!(model, "selected model has no pricing entry");
        }
        let staged = Settings {
            selected_model: model.to_owned(),
            ..self.settings.clone()
        };
        self.commit(staged)
    }

    /// Selects the dialect used for new requests.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] for a blank dialect and
    /// [`RevisionError::Storage`] when settings cannot be saved.
    pub fn select_dialect(&mut self, dialect: &str) -> Result<(), RevisionError> {
        let selected = non_blank(dialect, "dialect")?;
        let staged = Settings {
            selected_dialect: selected.to_owned(),
            ..self.settings.clone()
        };
        self.commit(staged)
    }

    /// Adds or replaces a custom mode.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] when the mode is invalid or
    /// shadows a built-in, and [`RevisionError::Storage`] when settings
    /// cannot be saved.
    pub fn save_custom_mode(&mut self, mode: CustomMode) -> Result<(), RevisionError> {
        mode.validate()?;
        if self.mode_catalog().is_builtin(&mode.id) {
            return Err(RevisionError::validation(format!(
                "'{}' is a built-in mode and cannot be replaced",
                mode.id
            )));
        }
        let mut staged = self.settings.clone();
        match staged
            .custom_modes
            .iter_mut()
            .find(|existing| existing.id == mode.id)
        {
            Some(existing) => *existing = mode,
            None => staged.custom_modes.push(mode),
        }
        self.commit(staged)
    }

    /// Deletes a custom mode, returning whether it existed.
    ///
    /// A deleted mode that was selected is replaced by the default mode.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Storage`] when settings cannot be saved.
    pub fn delete_custom_mode(&mut self, id: &str) -> Result<bool, RevisionError> {
        let mut staged = self.settings.clone();
        staged.custom_modes.retain(|mode| mode.id != id);
        if staged.custom_modes.len() == self.settings.custom_modes.len() {
            return Ok(false);
        }
        if staged.selected_mode == id {
            DEFAULT_MODE.clone_into(&mut staged.selected_mode);
        }
        self.commit(staged)?;
        Ok(true)
    }

    /// Zeroes the running totals.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Storage`] when settings cannot be saved.
    pub fn reset_stats(&mut self) -> Result<(), RevisionError> {
        let mut staged = self.settings.clone();
        staged.reset_totals();
        self.commit(staged)
    }

    /// Draft backup left by a failed revision, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Storage`] when the backup cannot be read.
    pub fn latest_backup(&self) -> Result<Option<DraftBackup>, RevisionError> {
        Ok(self.collaborators.backups.load()?)
    }

    /// Validates and stores an API key.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] for a malformed key and
    /// [`RevisionError::Storage`] when it cannot be stored.
    pub fn set_api_key(&self, key: &str) -> Result<CredentialProtection, RevisionError> {
        validate_api_key(key)?;
        Ok(self.collaborators.credentials.set(key.trim())?)
    }

    /// Forgets the stored API key.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Storage`] when it cannot be removed.
    pub fn delete_api_key(&self) -> Result<(), RevisionError> {
        Ok(self.collaborators.credentials.delete()?)
    }

    /// Checks the configured key against the completion endpoint.
    ///
    /// # Errors
    ///
    /// Returns the client's error when the key is missing or rejected.
    pub fn verify_credentials(&self) -> Result<(), RevisionError> {
        self.collaborators.client.verify_credentials()
    }

    fn save_backup(&self, request: &RevisionRequest, source: &str) -> String {
        let backup = DraftBackup {
            original_text: source.to_owned(),
            mode: request.mode().to_owned(),
            model: request.model().to_owned(),
            dialect: request.dialect().to_owned(),
            saved_at: Utc::now(),
        };
        match self.collaborators.backups.save(&backup) {
            Ok(()) => format!(" at {}", self.collaborators.backups.location()),
            Err(error) => {
                tracing::warn!(%error, "failed to write draft backup");
                String::new()
            }
        }
    }

    /// Saves `staged` and adopts it; the in-memory settings are untouched
    /// when the save fails.
    fn commit(&mut self, staged: Settings) -> Result<(), RevisionError> {
        self.collaborators.settings_store.save(&staged)?;
        self.settings = staged;
        Ok(())
    }

    fn persist_quietly(&self) {
        if let Err(error) = self.collaborators.settings_store.save(&self.settings) {
            tracing::warn!(%error, "failed to persist settings");
        }
    }
}

fn non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str, RevisionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RevisionError::validation(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests;
