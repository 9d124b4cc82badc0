//! Revision sessions wired to in-memory collaborators.

use std::sync::Arc;

use scholardraft::revision::test_support::RecordingSleeper;
use scholardraft::revision::{CompletionClient, Dictionary, PromptConfig};
use scholardraft::session::{RevisionSession, SessionCollaborators};
use scholardraft::storage::Settings;
use scholardraft::storage::test_support::{
    MemoryCredentialStore, MemoryDraftBackupStore, MemorySettingsStore,
};
use scholardraft::telemetry::RecordingTelemetrySink;

/// Doubles shared with a session so steps can inspect them afterwards.
#[derive(Debug, Clone)]
pub struct SessionDoubles {
    pub settings: Arc<MemorySettingsStore>,
    pub backups: Arc<MemoryDraftBackupStore>,
    pub sleeper: Arc<RecordingSleeper>,
    pub telemetry: Arc<RecordingTelemetrySink>,
}

impl SessionDoubles {
    /// Creates doubles whose settings start with `dictionary`.
    pub fn with_dictionary(dictionary: Dictionary) -> Self {
        let settings = Settings {
            dictionary,
            ..Settings::default()
        };
        Self {
            settings: Arc::new(MemorySettingsStore::with_settings(settings)),
            backups: Arc::new(MemoryDraftBackupStore::default()),
            sleeper: Arc::new(RecordingSleeper::default()),
            telemetry: Arc::new(RecordingTelemetrySink::default()),
        }
    }

    /// Builds a session over the built-in prompts and `client`.
    ///
    /// # Panics
    ///
    /// Panics if the built-in prompt document fails to parse.
    pub fn session(&self, client: Arc<dyn CompletionClient>) -> RevisionSession {
        let prompts = PromptConfig::builtin()
            .unwrap_or_else(|error| panic!("built-in prompts must parse: {error}"));
        RevisionSession::new(
            prompts,
            SessionCollaborators {
                settings_store: self.settings.clone(),
                credentials: Arc::new(MemoryCredentialStore::default()),
                backups: self.backups.clone(),
                client,
                sleeper: self.sleeper.clone(),
                telemetry: self.telemetry.clone(),
            },
        )
    }
}

impl Default for SessionDoubles {
    fn default() -> Self {
        Self::with_dictionary(Dictionary::new())
    }
}
