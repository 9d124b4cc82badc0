//! Data directory resolution.

use camino::{Utf8Path, Utf8PathBuf};

use super::error::StorageError;

const APP_DIR_NAME: &str = "scholardraft";

/// Resolves the directory holding settings, credentials, and draft backups.
///
/// An explicit directory wins. Otherwise defaults to
/// `${XDG_DATA_HOME}/scholardraft` when `XDG_DATA_HOME` is set, else to
/// `${HOME}/.local/share/scholardraft`.
///
/// # Errors
///
/// Returns [`StorageError::MissingDataDirectory`] when no explicit directory
/// is given and neither `XDG_DATA_HOME` nor `HOME` is available.
pub fn default_data_dir(explicit: Option<&Utf8Path>) -> Result<Utf8PathBuf, StorageError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let xdg = std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|value| !value.is_empty());
    let home = std::env::var("HOME").ok().filter(|value| !value.is_empty());

    resolve_data_dir(xdg.as_deref(), home.as_deref())
}

/// Resolves the data directory from optional environment values.
///
/// # Errors
///
/// Returns [`StorageError::MissingDataDirectory`] when both values are absent.
pub fn resolve_data_dir(
    xdg_data_home: Option<&str>,
    home: Option<&str>,
) -> Result<Utf8PathBuf, StorageError> {
    if let Some(data_home) = xdg_data_home {
        return Ok(Utf8PathBuf::from(data_home).join(APP_DIR_NAME));
    }

    if let Some(home_dir) = home {
        return Ok(Utf8PathBuf::from(home_dir)
            .join(".local")
            .join("share")
            .join(APP_DIR_NAME));
    }

    Err(StorageError::MissingDataDirectory)
}
