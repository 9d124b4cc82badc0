//! Persistent user preferences and running totals.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::revision::{CustomMode, DEFAULT_DIALECT, DEFAULT_MODE, DEFAULT_MODEL, Dictionary};

use super::error::StorageError;
use super::fs::{open_or_create_dir, read_optional, write_atomic};

/// File name of the settings document inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Process-wide preferences loaded at startup.
///
/// Missing fields fall back to their defaults so older documents keep
/// loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether revised text is shown with change highlighting.
    pub diff_highlight: bool,
    /// Number of successful revisions.
    pub total_polishes: u64,
    /// Estimated spend across all revisions, in US dollars.
    pub total_spent: f64,
    /// Model used for new revisions.
    pub selected_model: String,
    /// Mode used for new revisions.
    pub selected_mode: String,
    /// Dialect used for new revisions.
    pub selected_dialect: String,
    /// User-authored modes.
    pub custom_modes: Vec<CustomMode>,
    /// Terms protected during revision.
    pub dictionary: Dictionary,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            diff_highlight: true,
            total_polishes: 0,
            total_spent: 0.0,
            selected_model: DEFAULT_MODEL.to_owned(),
            selected_mode: DEFAULT_MODE.to_owned(),
            selected_dialect: DEFAULT_DIALECT.to_owned(),
            custom_modes: Vec::new(),
            dictionary: Dictionary::new(),
        }
    }
}

impl Settings {
    /// Adds one revision and its cost to the running totals.
    #[expect(
        clippy::float_arithmetic,
        reason = "allow float arithmetic for cost accumulation"
    )]
    pub fn record_polish(&mut self, cost: f64) {
        self.total_polishes = self.total_polishes.saturating_add(1);
        self.total_spent += cost;
    }

    /// Resets the running totals.
    pub const fn reset_totals(&mut self) {
        self.total_polishes = 0;
        self.total_spent = 0.0;
    }
}

/// Loads and saves [`Settings`].
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    /// Loads stored settings, or `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the document exists but cannot be read
    /// or decoded.
    fn load(&self) -> Result<Option<Settings>, StorageError>;

    /// Replaces the stored settings.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the document cannot be written.
    fn save(&self, settings: &Settings) -> Result<(), StorageError>;
}

/// Settings stored as pretty JSON in `settings.json`.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    dir: Utf8PathBuf,
}

impl JsonSettingsStore {
    /// Creates a store rooted at `dir`; the directory is created on save.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the settings document.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        self.dir.join(SETTINGS_FILE_NAME)
    }

    /// Directory holding the settings document.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Option<Settings>, StorageError> {
        let Some(content) = read_optional(&self.path(), "settings")? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|error| StorageError::Serialisation {
                what: "settings",
                message: error.to_string(),
            })
    }

    fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_vec_pretty(settings).map_err(|error| StorageError::Serialisation {
                what: "settings",
                message: error.to_string(),
            })?;
        let dir = open_or_create_dir(&self.dir, "settings")?;
        write_atomic(&dir, SETTINGS_FILE_NAME, &encoded, "settings")?;
        tracing::debug!(path = %self.path(), "saved settings");
        Ok(())
    }
}
