//! Unit tests for the revision session.

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::{RevisionSession, SessionCollaborators};
use crate::revision::test_support::{
    EchoCompletionClient, RecordingSleeper, ScriptedCompletionClient,
};
use crate::revision::{
    CompletionClient, CustomMode, ModeDefinition, PromptConfig, RetryPolicy, RevisionError,
    RevisionProgress, SilentProgress,
};
use crate::storage::test_support::{
    MemoryCredentialStore, MemoryDraftBackupStore, MemorySettingsStore,
};
use crate::storage::{MockSettingsStore, Settings, StorageError};
use crate::telemetry::{RecordingTelemetrySink, TelemetryEvent};

struct Harness {
    settings: Arc<MemorySettingsStore>,
    backups: Arc<MemoryDraftBackupStore>,
    sleeper: Arc<RecordingSleeper>,
    telemetry: Arc<RecordingTelemetrySink>,
}

impl Harness {
    fn new() -> Self {
        Self::with_settings_store(MemorySettingsStore::default())
    }

    fn with_settings_store(store: MemorySettingsStore) -> Self {
        Self {
            settings: Arc::new(store),
            backups: Arc::new(MemoryDraftBackupStore::default()),
            sleeper: Arc::new(RecordingSleeper::default()),
            telemetry: Arc::new(RecordingTelemetrySink::default()),
        }
    }

    fn session(&self, client: Arc<dyn CompletionClient>) -> RevisionSession {
        let prompts = PromptConfig::builtin().expect("built-in prompts parse");
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

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn network_error() -> RevisionError {
    RevisionError::Network {
        message: "connection reset".to_owned(),
    }
}

fn idle() -> Arc<ScriptedCompletionClient> {
    Arc::new(ScriptedCompletionClient::default())
}

fn scripted(
    responses: impl IntoIterator<Item = Result<String, RevisionError>>,
) -> Arc<ScriptedCompletionClient> {
    Arc::new(ScriptedCompletionClient::new(responses))
}

#[rstest]
#[case("")]
#[case("   \n\t ")]
fn blank_input_is_rejected_without_side_effects(harness: Harness, #[case] text: &str) {
    let client = scripted([Ok("unused".to_owned())]);
    let mut session = harness.session(client.clone());
    let request = session.build_request(text, false);

    let result = session.revise(&request, &mut SilentProgress);

    assert!(matches!(result, Err(RevisionError::Validation { .. })), "{result:?}");
    assert_eq!(client.request_count(), 0);
    assert!(harness.backups.saved().is_empty());
    assert_eq!(harness.settings.save_count(), 0);
}

#[rstest]
fn successful_revision_updates_history_totals_and_backup(harness: Harness) {
    let client = scripted([Ok("The big cat sat.".to_owned())]);
    let mut session = harness.session(client);
    let request = session.build_request("The cat sat.", false);

    let result = session
        .revise(&request, &mut SilentProgress)
        .expect("revision succeeds");

    assert_eq!(result.polished_text, "The big cat sat.");
    assert_eq!(result.attempts, 1);
    assert_eq!(result.chunks, 1);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.settings().total_polishes, 1);
    let stored = harness.settings.stored().expect("settings persisted");
    assert_eq!(stored.total_polishes, 1);
    assert_eq!(harness.backups.saved().len(), 1);
    assert!(harness.backups.current().is_none(), "backup removed on success");
    assert!(matches!(
        harness.telemetry.events().as_slice(),
        [TelemetryEvent::RevisionCompleted { attempts: 1, .. }]
    ));
}

#[rstest]
fn current_diff_marks_insertions(harness: Harness) {
    let client = scripted([Ok("The big cat sat.".to_owned())]);
    let mut session = harness.session(client);
    let request = session.build_request("The cat sat.", false);
    session
        .revise(&request, &mut SilentProgress)
        .expect("revision succeeds");

    assert_eq!(
        session.render_current_diff().as_deref(),
        Some("The <span class=\"diff-added\">big </span>cat sat.")
    );
}

#[rstest]
fn two_failures_then_success_returns_third_output(harness: Harness) {
    let client = scripted([
        Err(network_error()),
        Err(network_error()),
        Ok("third time lucky".to_owned()),
    ]);
    let mut session = harness.session(client.clone());
    let request = session.build_request("Draft text.", false);
    let mut events = Vec::new();
    let mut observer = |event: &RevisionProgress| events.push(event.clone());

    let result = session
        .revise(&request, &mut observer)
        .expect("third attempt succeeds");

    assert_eq!(result.polished_text, "third time lucky");
    assert_eq!(result.attempts, 3);
    assert_eq!(session.retry_attempts(), 0);
    assert_eq!(client.request_count(), 3);
    assert_eq!(
        harness.sleeper.recorded(),
        vec![Duration::from_secs(2), Duration::from_secs(2)]
    );
    let retries = events
        .iter()
        .filter(|event| matches!(event, RevisionProgress::RetryScheduled { .. }))
        .count();
    assert_eq!(retries, 2);
    let retried = harness
        .telemetry
        .events()
        .into_iter()
        .filter(|event| matches!(event, TelemetryEvent::RevisionRetried { .. }))
        .count();
    assert_eq!(retried, 2);
}

#[rstest]
fn exhausted_retries_keep_backup_and_point_at_it(harness: Harness) {
    let client = scripted([
        Err(network_error()),
        Err(network_error()),
        Err(network_error()),
    ]);
    let mut session = harness.session(client);
    let request = session.build_request("Keep me safe.", false);

    let error = session
        .revise(&request, &mut SilentProgress)
        .expect_err("all attempts fail");

    let RevisionError::RetriesExhausted {
        attempts,
        backup_hint,
        ..
    } = &error
    else {
        panic!("expected exhausted retries, got {error:?}");
    };
    assert_eq!(*attempts, 3);
    assert_eq!(backup_hint, " at memory://draft_backup.json");
    let backup = harness.backups.current().expect("backup kept");
    assert_eq!(backup.original_text, "Keep me safe.");
    assert_eq!(
        session.latest_backup().ok().flatten().map(|b| b.original_text),
        Some("Keep me safe.".to_owned())
    );
    assert!(session.history().is_empty());
    assert!(matches!(
        harness.telemetry.events().last(),
        Some(TelemetryEvent::RevisionFailed { .. })
    ));
}

#[rstest]
fn unknown_mode_is_a_configuration_error(harness: Harness) {
    let client = scripted([Ok("unused".to_owned())]);
    let mut session = harness.session(client.clone());
    let request = crate::revision::RevisionRequest::new("Text.", "poetry", "US English", "gpt-4o");

    let result = session.revise(&request, &mut SilentProgress);

    assert!(matches!(result, Err(RevisionError::Configuration { .. })));
    assert_eq!(client.request_count(), 0);
    assert!(harness.backups.saved().is_empty());
}

#[rstest]
fn protected_terms_round_trip_through_the_session(harness: Harness) {
    let client = Arc::new(EchoCompletionClient::default());
    let mut session = harness.session(client.clone());
    session
        .add_term("Smith et al.", None)
        .expect("term is added");
    let request = session.build_request("As shown by smith ET al., results hold.", false);
    let mut deltas = String::new();
    let mut observer = |event: &RevisionProgress| {
        if let RevisionProgress::Delta(text) = event {
            deltas.push_str(text);
        }
    };

    let result = session
        .revise(&request, &mut observer)
        .expect("revision succeeds");

    assert_eq!(result.polished_text, "As shown by smith ET al., results hold.");
    assert!(deltas.contains("[[PROTECTED_TERM_0]]"), "{deltas}");
    let sent = client.requests();
    assert!(sent.iter().all(|request| !request.user_text.contains("smith")));
}

#[rstest]
fn system_prompt_uses_dialect_mode_and_protection(harness: Harness) {
    let client = scripted([Ok("Done.".to_owned())]);
    let mut session = harness.session(client.clone());
    session
        .select_dialect("British English")
        .expect("dialect selected");
    session.select_mode("stem").expect("mode selected");
    let request = session.build_request("Text.", true);

    session
        .revise(&request, &mut SilentProgress)
        .expect("revision succeeds");

    let sent = client.requests();
    let prompt = sent
        .first()
        .map(|request| request.system_prompt.clone())
        .unwrap_or_default();
    assert!(prompt.contains("British English"), "{prompt}");
    assert!(prompt.contains("SPECIFIC FIELD INSTRUCTIONS:\n"), "{prompt}");
    let protection = session
        .prompt_config()
        .protection_instruction()
        .expect("built-in protection instruction");
    assert!(prompt.ends_with(protection), "{prompt}");
    let temperature = sent.first().map_or(0.0, |request| request.temperature);
    #[expect(clippy::float_arithmetic, reason = "test tolerance comparison")]
    let delta = (temperature - 0.2).abs();
    assert!(delta < f64::EPSILON, "{temperature}");
}

#[rstest]
fn custom_modes_are_saved_selected_and_deleted(harness: Harness) {
    let client = idle();
    let mut session = harness.session(client);
    let custom = CustomMode::new(
        "grant",
        ModeDefinition {
            label: "Grant proposal".to_owned(),
            description: String::new(),
            system_instruction: "Be persuasive.".to_owned(),
            temperature: 0.6,
        },
    )
    .expect("valid mode");

    session.save_custom_mode(custom).expect("mode saved");
    session.select_mode("grant").expect("custom mode selectable");
    assert_eq!(session.settings().selected_mode, "grant");

    assert_eq!(session.delete_custom_mode("grant"), Ok(true));
    assert_eq!(session.settings().selected_mode, "standard");
    assert_eq!(session.delete_custom_mode("grant"), Ok(false));
}

#[rstest]
fn custom_modes_cannot_replace_builtins(harness: Harness) {
    let mut session = harness.session(idle());
    let shadow = CustomMode::new(
        "stem",
        ModeDefinition {
            label: "Mine".to_owned(),
            description: String::new(),
            system_instruction: "Anything.".to_owned(),
            temperature: 0.1,
        },
    )
    .expect("valid mode");

    let result = session.save_custom_mode(shadow);

    assert!(matches!(result, Err(RevisionError::Validation { .. })));
}

#[rstest]
fn duplicate_terms_are_rejected(harness: Harness) {
    let mut session = harness.session(idle());
    session.add_term("CRISPR", None).expect("first add");

    let result = session.add_term("CRISPR", Some("crispr".to_owned()));

    assert!(matches!(result, Err(RevisionError::Validation { .. })));
    assert_eq!(session.dictionary().len(), 1);
    assert_eq!(session.remove_term("CRISPR"), Ok(true));
    assert_eq!(session.remove_term("CRISPR"), Ok(false));
}

#[rstest]
fn settings_edits_surface_storage_failures() {
    let harness = Harness::with_settings_store(MemorySettingsStore::failing());
    let mut session = harness.session(idle());
    let before = session.settings().clone();

    let added = session.add_term("CRISPR", None);
    let readded = session.add_term("CRISPR", None);

    assert!(matches!(added, Err(RevisionError::Storage(_))), "{added:?}");
    assert!(matches!(readded, Err(RevisionError::Storage(_))), "{readded:?}");
    assert!(session.dictionary().is_empty());
    assert!(session.select_mode("stem").is_err());
    assert!(session.select_model("gpt-4o").is_err());
    assert!(session.select_dialect("British English").is_err());
    assert!(session.reset_stats().is_err());
    assert_eq!(session.settings(), &before);
}

#[rstest]
fn failed_custom_mode_save_leaves_catalog_unchanged() {
    let harness = Harness::with_settings_store(MemorySettingsStore::failing());
    let mut session = harness.session(idle());
    let custom = CustomMode::new(
        "grant",
        ModeDefinition {
            label: "Grant proposal".to_owned(),
            description: String::new(),
            system_instruction: "Be persuasive.".to_owned(),
            temperature: 0.6,
        },
    )
    .expect("valid mode");

    let result = session.save_custom_mode(custom);

    assert!(matches!(result, Err(RevisionError::Storage(_))), "{result:?}");
    assert!(session.settings().custom_modes.is_empty());
    assert!(session.mode_catalog().resolve("grant").is_err());
}

#[rstest]
fn revising_the_same_document_keeps_every_version(harness: Harness) {
    let client = scripted([
        Ok("v1".to_owned()),
        Ok("v2".to_owned()),
        Ok("v3".to_owned()),
    ]);
    let mut session = harness.session(client);
    let request = session.build_request("Same document.", false);

    for _ in 0..3 {
        session
            .revise(&request, &mut SilentProgress)
            .expect("revision succeeds");
    }

    assert_eq!(session.history().len(), 3);
    assert_eq!(
        session.restore_version(0).map(|entry| entry.polished.clone()),
        Some("v1".to_owned())
    );
    assert_eq!(
        session.history().current().map(|entry| entry.original.clone()),
        Some("Same document.".to_owned())
    );
}

#[rstest]
fn a_new_document_clears_the_history(harness: Harness) {
    let client = scripted([
        Ok("First, polished.".to_owned()),
        Ok("First, polished again.".to_owned()),
        Ok("Second, polished.".to_owned()),
    ]);
    let mut session = harness.session(client);
    let first = session.build_request("First draft.", false);
    let second = session.build_request("Second draft.", false);

    for request in [&first, &first, &second] {
        session
            .revise(request, &mut SilentProgress)
            .expect("revision succeeds");
    }

    assert_eq!(session.history().len(), 1);
    assert_eq!(
        session.history().current().map(|entry| entry.polished.clone()),
        Some("Second, polished.".to_owned())
    );
}

#[rstest]
fn starting_a_document_discards_versions(harness: Harness) {
    let client = scripted([Ok("v1".to_owned()), Ok("v2".to_owned())]);
    let mut session = harness.session(client);
    let request = session.build_request("Same document.", false);
    session
        .revise(&request, &mut SilentProgress)
        .expect("revision succeeds");

    session.start_document();
    assert!(session.history().is_empty());
    session
        .revise(&request, &mut SilentProgress)
        .expect("revision succeeds");

    assert_eq!(session.history().len(), 1);
}

#[rstest]
fn custom_retry_policy_bounds_attempts(harness: Harness) {
    let client = scripted([Err(network_error()), Ok("unused".to_owned())]);
    let mut session = harness
        .session(client.clone())
        .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(10)));
    let request = session.build_request("Draft.", false);

    let result = session.revise(&request, &mut SilentProgress);

    assert!(
        matches!(result, Err(RevisionError::RetriesExhausted { attempts: 1, .. })),
        "{result:?}"
    );
    assert_eq!(client.request_count(), 1);
    assert!(harness.sleeper.recorded().is_empty());
}

#[rstest]
fn revision_survives_settings_persistence_failure() {
    let harness = Harness::with_settings_store(MemorySettingsStore::failing());
    let mut session = harness.session(scripted([Ok("Better.".to_owned())]));
    let request = session.build_request("Good.", false);

    let result = session.revise(&request, &mut SilentProgress);

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(session.settings().total_polishes, 1);
}

#[test]
fn unreadable_settings_fall_back_to_defaults() {
    let mut store = MockSettingsStore::new();
    store
        .expect_load()
        .times(1)
        .returning(|| Err(StorageError::io("disk on fire")));
    let prompts = PromptConfig::builtin().expect("built-in prompts parse");

    let session = RevisionSession::new(
        prompts,
        SessionCollaborators {
            settings_store: Arc::new(store),
            credentials: Arc::new(MemoryCredentialStore::default()),
            backups: Arc::new(MemoryDraftBackupStore::default()),
            client: idle(),
            sleeper: Arc::new(RecordingSleeper::default()),
            telemetry: Arc::new(RecordingTelemetrySink::default()),
        },
    );

    assert_eq!(session.settings(), &Settings::default());
}

#[rstest]
fn restoring_out_of_range_versions_is_a_no_op(harness: Harness) {
    let mut session = harness.session(scripted([Ok("v1".to_owned())]));
    let request = session.build_request("v0", false);
    session
        .revise(&request, &mut SilentProgress)
        .expect("revision succeeds");

    assert!(session.restore_version(3).is_none());
    assert_eq!(
        session.restore_version(0).map(|entry| entry.polished.clone()),
        Some("v1".to_owned())
    );
}

#[rstest]
fn api_keys_are_validated_before_storing(harness: Harness) {
    let session = harness.session(idle());

    assert!(matches!(
        session.set_api_key("not-a-key"),
        Err(RevisionError::Validation { .. })
    ));
    assert!(session.set_api_key("sk-valid").is_ok());
    assert!(session.delete_api_key().is_ok());
}

#[rstest]
fn submission_estimate_doubles_round_trip(harness: Harness) {
    let session = harness.session(idle());
    let text = "a".repeat(4_000);

    let estimate = session.estimate_submission_cost(&text);

    #[expect(clippy::float_arithmetic, reason = "test tolerance comparison")]
    let delta = (estimate - 0.0015).abs();
    assert!(delta < 1e-12, "{estimate}");
}
