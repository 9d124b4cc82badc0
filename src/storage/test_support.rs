//! In-memory stores for session tests.

use std::sync::{Mutex, PoisonError};

use super::backup::{DraftBackup, DraftBackupStore};
use super::credentials::{CredentialProtection, CredentialStore};
use super::error::StorageError;
use super::settings::{Settings, SettingsStore};

/// Settings store backed by memory, optionally failing every save.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    stored: Mutex<Option<Settings>>,
    saves: Mutex<usize>,
    fail_saves: bool,
}

impl MemorySettingsStore {
    /// Creates a store that already holds `settings`.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            stored: Mutex::new(Some(settings)),
            ..Self::default()
        }
    }

    /// Creates a store whose saves fail with an I/O error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Most recently saved settings.
    #[must_use]
    pub fn stored(&self) -> Option<Settings> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<Settings>, StorageError> {
        Ok(self.stored())
    }

    fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::io("settings store is read-only"));
        }
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        let mut saves = self.saves.lock().unwrap_or_else(PoisonError::into_inner);
        *saves = saves.saturating_add(1);
        Ok(())
    }
}

/// Draft backup store backed by memory that remembers every save.
#[derive(Debug, Default)]
pub struct MemoryDraftBackupStore {
    current: Mutex<Option<DraftBackup>>,
    history: Mutex<Vec<DraftBackup>>,
}

impl MemoryDraftBackupStore {
    /// Backup currently stored.
    #[must_use]
    pub fn current(&self) -> Option<DraftBackup> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every backup ever saved, oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<DraftBackup> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DraftBackupStore for MemoryDraftBackupStore {
    fn save(&self, backup: &DraftBackup) -> Result<(), StorageError> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(backup.clone());
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(backup.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<DraftBackup>, StorageError> {
        Ok(self.current())
    }

    fn delete(&self) -> Result<(), StorageError> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory://draft_backup.json".to_owned()
    }
}

/// Credential store backed by memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    key: Mutex<Option<String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set(&self, key: &str) -> Result<CredentialProtection, StorageError> {
        *self.key.lock().unwrap_or_else(PoisonError::into_inner) = Some(key.to_owned());
        Ok(CredentialProtection::OwnerOnly)
    }

    fn delete(&self) -> Result<(), StorageError> {
        *self.key.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
