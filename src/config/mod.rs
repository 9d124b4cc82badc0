//! Application configuration loaded from CLI, environment, and files.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.scholardraft.toml` in the current
//!    directory, home directory, or XDG config directory
//! 3. **Environment variables** – `SCHOLARDRAFT_*`, plus the legacy
//!    `OPENAI_API_KEY` for the API key
//! 4. **Command-line arguments** – `--text`, `--mode`, and friends
//!
//! # Configuration File
//!
//! ```toml
//! model = "gpt-4o"
//! dialect = "British English"
//! chunk_token_budget = 2500
//! data_dir = "/home/alice/.local/share/scholardraft"
//! ```

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::export::{ExportError, ExportFormat, ExportMetadata, FormattingOptions};
use crate::revision::{
    DEFAULT_BASE_URL, DEFAULT_CHUNK_TOKEN_BUDGET, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS,
    PipelineOptions, RevisionError,
};

/// Environment variable consulted when no API key is configured.
pub const LEGACY_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Operation selected by the configured flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationMode {
    /// Print the available revision modes.
    ListModes,
    /// Store a new API key.
    SetApiKey(String),
    /// Forget the stored API key.
    DeleteApiKey,
    /// Check the API key against the completion endpoint.
    VerifyApiKey,
    /// Add a term to the protection dictionary.
    AddTerm {
        /// Term to protect.
        term: String,
        /// Optional replacement applied on restore.
        replacement: Option<String>,
    },
    /// Remove a term from the protection dictionary.
    RemoveTerm(String),
    /// Print the protection dictionary.
    ListTerms,
    /// Zero the running totals.
    ResetStats,
    /// Print the draft backup left by a failed revision.
    RestoreBackup,
    /// Print the pre-submission cost estimate without revising.
    EstimateOnly,
    /// Revise the input text.
    Revise,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// Boolean switches are read from the CLI and configuration files only;
/// `ortho_config` does not load boolean values from the environment.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "SCHOLARDRAFT",
    discovery(
        dotfile_name = ".scholardraft.toml",
        config_file_name = "scholardraft.toml",
        app_name = "scholardraft"
    )
)]
pub struct ScholarDraftConfig {
    /// Text to revise, given inline.
    #[ortho_config(cli_short = 't')]
    pub text: Option<String>,

    /// File holding the text to revise.
    #[ortho_config(cli_short = 'i')]
    pub input: Option<String>,

    /// Revision mode identifier; persisted as the new selection.
    #[ortho_config(cli_short = 'm')]
    pub mode: Option<String>,

    /// Target dialect, for example `British English`; persisted.
    #[ortho_config(cli_short = 'd')]
    pub dialect: Option<String>,

    /// Model identifier; persisted.
    #[ortho_config()]
    pub model: Option<String>,

    /// Adds the term-protection instruction to the system prompt.
    #[ortho_config()]
    pub latex_protect: bool,

    /// Requests whole responses instead of streamed deltas.
    #[ortho_config()]
    pub no_stream: bool,

    /// Prints the diff markup after the revised text.
    #[ortho_config()]
    pub show_diff: bool,

    /// API key for the completion endpoint.
    ///
    /// Falls back to `OPENAI_API_KEY` and then to the stored key.
    #[ortho_config()]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[ortho_config()]
    pub api_base_url: Option<String>,

    /// HTTP timeout in seconds.
    #[ortho_config()]
    pub timeout_seconds: u64,

    /// Completion token limit per chunk.
    #[ortho_config()]
    pub max_tokens: u64,

    /// Estimated token budget per chunk.
    #[ortho_config()]
    pub chunk_token_budget: u64,

    /// Directory holding settings, credentials, and draft backups.
    #[ortho_config()]
    pub data_dir: Option<String>,

    /// Prompt configuration document replacing the built-in one.
    #[ortho_config()]
    pub prompts_path: Option<String>,

    /// Export format: `text`, `markdown`, `json`, `pdf`, or `docx`.
    #[ortho_config()]
    pub export_format: Option<String>,

    /// Destination file for the export.
    #[ortho_config(cli_short = 'o')]
    pub export_path: Option<String>,

    /// Document title used by exporters.
    #[ortho_config()]
    pub export_title: Option<String>,

    /// Document author used by exporters.
    #[ortho_config()]
    pub export_author: Option<String>,

    /// Document subject used by exporters.
    #[ortho_config()]
    pub export_subject: Option<String>,

    /// Double-spaces exported text.
    #[ortho_config()]
    pub export_double_spaced: bool,

    /// Numbers exported lines.
    #[ortho_config()]
    pub export_line_numbers: bool,

    /// Font for exported documents; unknown names fall back to a serif face.
    #[ortho_config()]
    pub export_font: Option<String>,

    /// Prints the cost estimate and exits.
    #[ortho_config()]
    pub estimate_only: bool,

    /// Lists the available modes and exits.
    #[ortho_config()]
    pub list_modes: bool,

    /// Stores the given API key and exits.
    #[ortho_config()]
    pub set_api_key: Option<String>,

    /// Deletes the stored API key and exits.
    #[ortho_config()]
    pub delete_api_key: bool,

    /// Verifies the API key and exits.
    #[ortho_config()]
    pub verify_api_key: bool,

    /// Adds a term to the protection dictionary and exits.
    #[ortho_config(cli_short = 'w')]
    pub add_term: Option<String>,

    /// Replacement for the term given with `--add-term`.
    #[ortho_config()]
    pub term_replacement: Option<String>,

    /// Removes a term from the protection dictionary and exits.
    #[ortho_config(cli_short = 'W')]
    pub remove_term: Option<String>,

    /// Lists the protection dictionary and exits.
    #[ortho_config(cli_short = 'j')]
    pub list_terms: bool,

    /// Zeroes the running totals and exits.
    #[ortho_config(cli_short = 'z')]
    pub reset_stats: bool,

    /// Prints the draft backup and exits.
    #[ortho_config()]
    pub restore_backup: bool,

    /// Writes telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for ScholarDraftConfig {
    fn default() -> Self {
        Self {
            text: None,
            input: None,
            mode: None,
            dialect: None,
            model: None,
            latex_protect: false,
            no_stream: false,
            show_diff: false,
            api_key: None,
            api_base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_tokens: u64::from(DEFAULT_MAX_TOKENS),
            chunk_token_budget: u64::try_from(DEFAULT_CHUNK_TOKEN_BUDGET).unwrap_or(u64::MAX),
            data_dir: None,
            prompts_path: None,
            export_format: None,
            export_path: None,
            export_title: None,
            export_author: None,
            export_subject: None,
            export_double_spaced: false,
            export_line_numbers: false,
            export_font: None,
            estimate_only: false,
            list_modes: false,
            set_api_key: None,
            delete_api_key: false,
            verify_api_key: false,
            add_term: None,
            term_replacement: None,
            remove_term: None,
            list_terms: false,
            reset_stats: false,
            restore_backup: false,
            telemetry: false,
        }
    }
}

impl ScholarDraftConfig {
    /// Determines the operation from the configured flags.
    ///
    /// Maintenance operations take precedence over revising, in the order
    /// the variants of [`OperationMode`] are declared.
    #[must_use]
    pub fn operation_mode(&self) -> OperationMode {
        if self.list_modes {
            OperationMode::ListModes
        } else if let Some(key) = &self.set_api_key {
            OperationMode::SetApiKey(key.clone())
        } else if self.delete_api_key {
            OperationMode::DeleteApiKey
        } else if self.verify_api_key {
            OperationMode::VerifyApiKey
        } else if let Some(term) = &self.add_term {
            OperationMode::AddTerm {
                term: term.clone(),
                replacement: self.term_replacement.clone(),
            }
        } else if let Some(term) = &self.remove_term {
            OperationMode::RemoveTerm(term.clone())
        } else if self.list_terms {
            OperationMode::ListTerms
        } else if self.reset_stats {
            OperationMode::ResetStats
        } else if self.restore_backup {
            OperationMode::RestoreBackup
        } else if self.estimate_only {
            OperationMode::EstimateOnly
        } else {
            OperationMode::Revise
        }
    }

    /// Resolves the API key from configuration or `OPENAI_API_KEY`.
    ///
    /// Returns `None` when neither provides a non-empty value; the caller
    /// then consults the credential store.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env::var(LEGACY_API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Explicit data directory, when configured.
    #[must_use]
    pub fn data_dir(&self) -> Option<Utf8PathBuf> {
        self.data_dir.as_deref().map(Utf8PathBuf::from)
    }

    /// Prompt configuration path, when configured.
    #[must_use]
    pub fn prompts_path(&self) -> Option<Utf8PathBuf> {
        self.prompts_path.as_deref().map(Utf8PathBuf::from)
    }

    /// Base URL of the completion endpoint.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Base URL parsed and checked as an absolute `http` or `https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] when the URL does not parse
    /// or uses another scheme.
    pub fn endpoint_url(&self) -> Result<Url, RevisionError> {
        let raw = self.api_base_url();
        let url = Url::parse(raw).map_err(|error| {
            RevisionError::configuration(format!("invalid api_base_url '{raw}': {error}"))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(RevisionError::configuration(format!(
                "api_base_url must use http or https, got '{scheme}'"
            ))),
        }
    }

    /// HTTP timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Pipeline options derived from the limits and the streaming switch.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] when a limit is zero or
    /// does not fit the target type.
    pub fn pipeline_options(&self) -> Result<PipelineOptions, RevisionError> {
        let max_tokens = u32::try_from(self.max_tokens)
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| {
                RevisionError::configuration(format!(
                    "max_tokens must be between 1 and {}, got {}",
                    u32::MAX,
                    self.max_tokens
                ))
            })?;
        let chunk_token_budget = usize::try_from(self.chunk_token_budget)
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| {
                RevisionError::configuration(format!(
                    "chunk_token_budget must be positive, got {}",
                    self.chunk_token_budget
                ))
            })?;
        Ok(PipelineOptions {
            max_tokens,
            chunk_token_budget,
            stream: !self.no_stream,
        })
    }

    /// Export format, when an export was requested.
    ///
    /// Without an explicit format the extension of `export_path` decides,
    /// falling back to plain text.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedFormat`] for an unknown format.
    pub fn export_format(&self) -> Result<Option<ExportFormat>, ExportError> {
        if let Some(format) = self.export_format.as_deref() {
            return format.parse().map(Some);
        }
        let Some(path) = self.export_path.as_deref() else {
            return Ok(None);
        };
        let format = Utf8PathBuf::from(path)
            .extension()
            .and_then(|extension| extension.parse().ok())
            .unwrap_or(ExportFormat::Text);
        Ok(Some(format))
    }

    /// Export metadata assembled from the `export_*` fields.
    #[must_use]
    pub fn export_metadata(&self) -> ExportMetadata {
        ExportMetadata {
            title: self.export_title.clone(),
            author: self.export_author.clone(),
            subject: self.export_subject.clone(),
            formatting: FormattingOptions {
                double_spaced: self.export_double_spaced,
                line_numbers: self.export_line_numbers,
                font: self.export_font.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests;
