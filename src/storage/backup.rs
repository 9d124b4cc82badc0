//! Draft backup written before a revision starts.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::StorageError;
use super::fs::{open_dir, open_or_create_dir, read_optional, remove_if_present, write_atomic};

/// File name of the draft backup inside the data directory.
pub const BACKUP_FILE_NAME: &str = "draft_backup.json";

/// Original text and selections of an in-flight revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftBackup {
    /// Text submitted for revision.
    pub original_text: String,
    /// Selected mode identifier.
    pub mode: String,
    /// Selected model identifier.
    pub model: String,
    /// Selected dialect.
    pub dialect: String,
    /// When the backup was written.
    pub saved_at: DateTime<Utc>,
}

/// Saves, loads, and removes the draft backup.
#[cfg_attr(test, mockall::automock)]
pub trait DraftBackupStore: Send + Sync + std::fmt::Debug {
    /// Replaces the stored backup.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backup cannot be written.
    fn save(&self, backup: &DraftBackup) -> Result<(), StorageError>;

    /// Returns the stored backup, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backup exists but cannot be read.
    fn load(&self) -> Result<Option<DraftBackup>, StorageError>;

    /// Removes the stored backup; succeeds when none exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backup cannot be removed.
    fn delete(&self) -> Result<(), StorageError>;

    /// Human-readable location shown in recovery guidance.
    fn location(&self) -> String;
}

/// Backup stored as JSON in `draft_backup.json`.
#[derive(Debug, Clone)]
pub struct JsonDraftBackupStore {
    dir: Utf8PathBuf,
}

impl JsonDraftBackupStore {
    /// Creates a store rooted at `dir`; the directory is created on save.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the backup document.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        self.dir.join(BACKUP_FILE_NAME)
    }

    fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

impl DraftBackupStore for JsonDraftBackupStore {
    fn save(&self, backup: &DraftBackup) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_vec_pretty(backup).map_err(|error| StorageError::Serialisation {
                what: "draft backup",
                message: error.to_string(),
            })?;
        let dir = open_or_create_dir(self.dir(), "draft backup")?;
        write_atomic(&dir, BACKUP_FILE_NAME, &encoded, "draft backup")
    }

    fn load(&self) -> Result<Option<DraftBackup>, StorageError> {
        let Some(content) = read_optional(&self.path(), "draft backup")? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|error| StorageError::Serialisation {
                what: "draft backup",
                message: error.to_string(),
            })
    }

    fn delete(&self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            return Ok(());
        }
        let dir = open_dir(self.dir(), "draft backup")?;
        remove_if_present(&dir, BACKUP_FILE_NAME, "draft backup")
    }

    fn location(&self) -> String {
        self.path().into_string()
    }
}
