//! API key storage in the platform credential vault.

use keyring::Entry;

use super::credentials::{CredentialProtection, CredentialStore};
use super::error::StorageError;

/// Service name the key is filed under.
pub const KEYCHAIN_SERVICE: &str = "scholardraft";

/// Account name the key is filed under.
pub const KEYCHAIN_ACCOUNT: &str = "openai-api-key";

const PERSISTENT_VAULT: bool = cfg!(any(target_os = "macos", target_os = "windows"));

/// Keeps the key in the operating system's credential vault: the macOS
/// Keychain or the Windows Credential Manager.
#[derive(Debug)]
pub struct KeychainCredentialStore {
    entry: Entry,
}

impl KeychainCredentialStore {
    /// Opens the vault entry for the default service and account.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the platform offers no persistent
    /// vault.
    pub fn open() -> Result<Self, StorageError> {
        if !PERSISTENT_VAULT {
            return Err(StorageError::io(
                "no persistent credential vault on this platform",
            ));
        }
        Self::for_account(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT)
    }

    /// Opens the vault entry for `service` and `account`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the platform offers no vault.
    pub fn for_account(service: &str, account: &str) -> Result<Self, StorageError> {
        let entry = Entry::new(service, account).map_err(|error| vault_error("open", &error))?;
        Ok(Self { entry })
    }
}

fn vault_error(action: &str, error: &keyring::Error) -> StorageError {
    StorageError::io(format!("failed to {action} the credential vault entry: {error}"))
}

impl CredentialStore for KeychainCredentialStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        match self.entry.get_password() {
            Ok(key) => Ok(Some(key.trim().to_owned()).filter(|key| !key.is_empty())),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(vault_error("read", &error)),
        }
    }

    fn set(&self, key: &str) -> Result<CredentialProtection, StorageError> {
        self.entry
            .set_password(key.trim())
            .map_err(|error| vault_error("write", &error))?;
        Ok(CredentialProtection::Keychain)
    }

    fn delete(&self) -> Result<(), StorageError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(vault_error("delete", &error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::KeychainCredentialStore;
    use crate::storage::{CredentialProtection, CredentialStore};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn vault_entries_round_trip() -> TestResult {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let store = KeychainCredentialStore::for_account("scholardraft-test", "round-trip")?;

        assert_eq!(store.get()?, None);
        assert_eq!(store.set("sk-vaulted\n")?, CredentialProtection::Keychain);
        assert_eq!(store.get()?.as_deref(), Some("sk-vaulted"));
        store.delete()?;
        assert_eq!(store.get()?, None);
        store.delete()?;
        Ok(())
    }
}
