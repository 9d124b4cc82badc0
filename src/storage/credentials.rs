//! API key storage.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::revision::RevisionError;

use super::error::StorageError;
use super::fs::{open_dir, open_or_create_dir, read_optional, remove_if_present};

/// File name of the stored API key inside the data directory.
pub const CREDENTIALS_FILE_NAME: &str = "api_key";

/// Prefix every accepted API key carries.
pub const API_KEY_PREFIX: &str = "sk-";

/// How well a stored key is shielded from other local users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialProtection {
    /// Encrypted by the platform credential vault.
    Keychain,
    /// Readable only by the owning user.
    OwnerOnly,
    /// Stored without access restrictions.
    Plaintext,
}

/// Rejects keys that are blank or lack the [`API_KEY_PREFIX`].
///
/// # Errors
///
/// Returns [`RevisionError::Validation`] for a malformed key.
pub fn validate_api_key(key: &str) -> Result<(), RevisionError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RevisionError::validation("API key must not be empty"));
    }
    if !trimmed.starts_with(API_KEY_PREFIX) {
        return Err(RevisionError::validation(format!(
            "API key should start with '{API_KEY_PREFIX}'"
        )));
    }
    Ok(())
}

/// Reads, replaces, and forgets the stored API key.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Returns the stored key, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store cannot be read.
    fn get(&self) -> Result<Option<String>, StorageError>;

    /// Replaces the stored key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the key cannot be written.
    fn set(&self, key: &str) -> Result<CredentialProtection, StorageError>;

    /// Removes the stored key; succeeds when nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the key cannot be removed.
    fn delete(&self) -> Result<(), StorageError>;
}

/// Stores the key in a file restricted to the owning user where the
/// platform allows it.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: Utf8PathBuf,
}

impl FileCredentialStore {
    /// Creates a store rooted at `dir`; the directory is created on write.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the stored key.
    #[must_use]
    pub fn path(&self) -> Utf8PathBuf {
        self.dir.join(CREDENTIALS_FILE_NAME)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(read_optional(&self.path(), "credentials")?
            .map(|content| content.trim().to_owned())
            .filter(|key| !key.is_empty()))
    }

    fn set(&self, key: &str) -> Result<CredentialProtection, StorageError> {
        let dir = open_or_create_dir(&self.dir, "credentials")?;
        write_key(&dir, key.trim(), &self.path())
    }

    fn delete(&self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            return Ok(());
        }
        let dir = open_dir(&self.dir, "credentials")?;
        remove_if_present(&dir, CREDENTIALS_FILE_NAME, "credentials")
    }
}

#[cfg(unix)]
fn write_key(
    dir: &cap_std::fs_utf8::Dir,
    key: &str,
    path: &Utf8Path,
) -> Result<CredentialProtection, StorageError> {
    super::fs::write_atomic_owner_only(dir, CREDENTIALS_FILE_NAME, key.as_bytes(), "credentials")?;
    tracing::debug!(%path, "stored API key with owner-only permissions");
    Ok(CredentialProtection::OwnerOnly)
}

#[cfg(not(unix))]
fn write_key(
    dir: &cap_std::fs_utf8::Dir,
    key: &str,
    path: &Utf8Path,
) -> Result<CredentialProtection, StorageError> {
    super::fs::write_atomic(dir, CREDENTIALS_FILE_NAME, key.as_bytes(), "credentials")?;
    tracing::warn!(%path, "API key stored without owner-only permissions on this platform");
    Ok(CredentialProtection::Plaintext)
}

/// Prefers a primary store and falls back to a second one when the
/// primary is unavailable.
///
/// A key saved in the primary store removes any copy left in the
/// fallback.
#[derive(Debug, Clone)]
pub struct FallbackCredentialStore {
    primary: Arc<dyn CredentialStore>,
    fallback: Arc<dyn CredentialStore>,
}

impl FallbackCredentialStore {
    /// Layers `primary` over `fallback`.
    #[must_use]
    pub fn new(primary: Arc<dyn CredentialStore>, fallback: Arc<dyn CredentialStore>) -> Self {
        Self { primary, fallback }
    }
}

impl CredentialStore for FallbackCredentialStore {
    fn get(&self) -> Result<Option<String>, StorageError> {
        match self.primary.get() {
            Ok(Some(key)) => return Ok(Some(key)),
            Ok(None) => {}
            Err(error) => {
                tracing::debug!(%error, "primary credential store unavailable; reading fallback");
            }
        }
        self.fallback.get()
    }

    fn set(&self, key: &str) -> Result<CredentialProtection, StorageError> {
        match self.primary.set(key) {
            Ok(protection) => {
                if let Err(error) = self.fallback.delete() {
                    tracing::warn!(%error, "failed to remove the fallback copy of the API key");
                }
                Ok(protection)
            }
            Err(error) => {
                tracing::warn!(%error, "primary credential store unavailable; using fallback");
                self.fallback.set(key)
            }
        }
    }

    fn delete(&self) -> Result<(), StorageError> {
        let primary = self.primary.delete();
        let fallback = self.fallback.delete();
        primary.and(fallback)
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use std::sync::Arc;

    use super::{
        CredentialProtection, CredentialStore, FallbackCredentialStore, FileCredentialStore,
        MockCredentialStore, validate_api_key,
    };
    use crate::revision::RevisionError;
    use crate::storage::StorageError;
    use crate::storage::test_support::MemoryCredentialStore;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    struct StoreFixture {
        _temp_dir: TempDir,
        store: FileCredentialStore,
    }

    #[fixture]
    fn fixture() -> StoreFixture {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(temp_dir.path().join("data"))
            .expect("temp dir path should be UTF-8");
        StoreFixture {
            _temp_dir: temp_dir,
            store: FileCredentialStore::new(root),
        }
    }

    #[rstest]
    #[case("sk-abc123", true)]
    #[case("  sk-padded  ", true)]
    #[case("", false)]
    #[case("   ", false)]
    #[case("pk-wrong", false)]
    fn validates_key_shape(#[case] key: &str, #[case] accepted: bool) {
        let result = validate_api_key(key);

        assert_eq!(result.is_ok(), accepted, "{result:?}");
        if let Err(error) = result {
            assert!(matches!(error, RevisionError::Validation { .. }));
        }
    }

    #[rstest]
    fn set_get_delete_round_trip(fixture: StoreFixture) -> TestResult {
        assert_eq!(fixture.store.get()?, None);

        fixture.store.set("sk-test-key\n")?;
        assert_eq!(fixture.store.get()?.as_deref(), Some("sk-test-key"));

        fixture.store.delete()?;
        assert_eq!(fixture.store.get()?, None);
        Ok(())
    }

    #[rstest]
    fn delete_without_stored_key_succeeds(fixture: StoreFixture) -> TestResult {
        fixture.store.delete()?;
        Ok(())
    }

    #[cfg(unix)]
    #[rstest]
    fn stored_key_is_owner_only(fixture: StoreFixture) -> TestResult {
        use std::os::unix::fs::PermissionsExt;

        let protection = fixture.store.set("sk-secret")?;

        let mode = std::fs::metadata(fixture.store.path())?.permissions().mode();
        assert_eq!(protection, CredentialProtection::OwnerOnly);
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    fn unavailable_vault() -> MockCredentialStore {
        let mut vault = MockCredentialStore::new();
        vault
            .expect_get()
            .returning(|| Err(StorageError::io("no vault")));
        vault
            .expect_set()
            .returning(|_| Err(StorageError::io("no vault")));
        vault.expect_delete().returning(|| Ok(()));
        vault
    }

    #[rstest]
    fn fallback_is_used_when_the_vault_is_unavailable() -> TestResult {
        let fallback = Arc::new(MemoryCredentialStore::default());
        let store = FallbackCredentialStore::new(Arc::new(unavailable_vault()), fallback.clone());

        let protection = store.set("sk-fallback")?;

        assert_eq!(protection, CredentialProtection::OwnerOnly);
        assert_eq!(fallback.get()?.as_deref(), Some("sk-fallback"));
        assert_eq!(store.get()?.as_deref(), Some("sk-fallback"));
        Ok(())
    }

    #[rstest]
    fn keys_saved_in_the_vault_clear_the_fallback_copy() -> TestResult {
        let mut vault = MockCredentialStore::new();
        vault
            .expect_set()
            .times(1)
            .returning(|_| Ok(CredentialProtection::Keychain));
        vault
            .expect_get()
            .returning(|| Ok(Some("sk-vault".to_owned())));
        let fallback = Arc::new(MemoryCredentialStore::default());
        fallback.set("sk-stale")?;
        let store = FallbackCredentialStore::new(Arc::new(vault), fallback.clone());

        let protection = store.set("sk-vault")?;

        assert_eq!(protection, CredentialProtection::Keychain);
        assert_eq!(fallback.get()?, None);
        assert_eq!(store.get()?.as_deref(), Some("sk-vault"));
        Ok(())
    }

    #[rstest]
    fn deleting_clears_both_stores() -> TestResult {
        let mut vault = MockCredentialStore::new();
        vault.expect_delete().times(1).returning(|| Ok(()));
        vault.expect_get().returning(|| Ok(None));
        let fallback = Arc::new(MemoryCredentialStore::default());
        fallback.set("sk-old")?;
        let store = FallbackCredentialStore::new(Arc::new(vault), fallback.clone());

        store.delete()?;

        assert_eq!(store.get()?, None);
        Ok(())
    }
}
