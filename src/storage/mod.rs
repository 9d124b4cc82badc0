//! Local persistence for settings, credentials, and draft backups.
//!
//! Every store writes beneath a single data directory (see
//! [`default_data_dir`]) using capability-based file handles, and every
//! write goes through a temporary file renamed into place.

mod backup;
mod credentials;
mod error;
mod fs;
mod keychain;
mod paths;
mod settings;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use backup::{BACKUP_FILE_NAME, DraftBackup, DraftBackupStore, JsonDraftBackupStore};
pub use credentials::{
    API_KEY_PREFIX, CREDENTIALS_FILE_NAME, CredentialProtection, CredentialStore,
    FallbackCredentialStore, FileCredentialStore, validate_api_key,
};
pub use error::StorageError;
pub use keychain::{KEYCHAIN_ACCOUNT, KEYCHAIN_SERVICE, KeychainCredentialStore};
pub use paths::{default_data_dir, resolve_data_dir};
pub use settings::{JsonSettingsStore, SETTINGS_FILE_NAME, Settings, SettingsStore};

pub(crate) use fs::{open_or_create_dir, read_optional, split_path, write_atomic};

#[cfg(test)]
pub use backup::MockDraftBackupStore;
#[cfg(test)]
pub use credentials::MockCredentialStore;
#[cfg(test)]
pub use settings::MockSettingsStore;
