//! Capability-based file helpers shared by the stores and exporters.

use std::io::{ErrorKind, Write};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};

use super::error::StorageError;

/// Splits `path` into its parent directory and file name.
pub(crate) fn split_path<'a>(
    path: &'a Utf8Path,
    label: &str,
) -> Result<(&'a Utf8Path, &'a str), StorageError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| StorageError::io(format!("invalid {label} path '{path}': no file name")))?;
    Ok((parent, file_name))
}

/// Opens an existing directory using ambient authority.
pub(crate) fn open_dir(path: &Utf8Path, label: &str) -> Result<Dir, StorageError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|error| {
        StorageError::io(format!("failed to open {label} directory '{path}': {error}"))
    })
}

/// Opens a directory, creating it and its parents first when missing.
pub(crate) fn open_or_create_dir(path: &Utf8Path, label: &str) -> Result<Dir, StorageError> {
    Dir::create_ambient_dir_all(path, ambient_authority()).map_err(|error| {
        StorageError::io(format!("failed to create {label} directory '{path}': {error}"))
    })?;
    open_dir(path, label)
}

/// Reads a UTF-8 file, returning `None` when it (or its directory) is absent.
pub(crate) fn read_optional(path: &Utf8Path, label: &str) -> Result<Option<String>, StorageError> {
    let (parent, file_name) = split_path(path, label)?;
    let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(StorageError::io(format!(
                "failed to open {label} directory '{parent}': {error}"
            )));
        }
    };

    match dir.read_to_string(file_name) {
        Ok(content) => Ok(Some(content)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(StorageError::io(format!(
            "failed to read {label} '{path}': {error}"
        ))),
    }
}

/// Writes `contents` beside the target and renames it into place.
///
/// Readers observe either the previous file or the complete new one.
pub(crate) fn write_atomic(
    dir: &Dir,
    file_name: &str,
    contents: &[u8],
    label: &str,
) -> Result<(), StorageError> {
    write_atomic_with(dir, file_name, contents, label, OpenOptions::new())
}

/// Like [`write_atomic`], but the file is created readable and writable
/// by the owning user only, before any byte is written.
#[cfg(unix)]
pub(crate) fn write_atomic_owner_only(
    dir: &Dir,
    file_name: &str,
    contents: &[u8],
    label: &str,
) -> Result<(), StorageError> {
    use cap_std::fs_utf8::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.mode(0o600);
    write_atomic_with(dir, file_name, contents, label, options)
}

fn write_atomic_with(
    dir: &Dir,
    file_name: &str,
    contents: &[u8],
    label: &str,
    mut options: OpenOptions,
) -> Result<(), StorageError> {
    let temporary = format!(".{file_name}.tmp");
    remove_if_present(dir, &temporary, label)?;
    options.write(true).create_new(true);

    let written = dir
        .open_with(&temporary, &options)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        });
    if let Err(error) = written {
        let _cleanup_ignored = dir.remove_file(&temporary);
        return Err(StorageError::io(format!(
            "failed to write temporary {label} file: {error}"
        )));
    }

    dir.rename(&temporary, dir, file_name).map_err(|error| {
        let _cleanup_ignored = dir.remove_file(&temporary);
        StorageError::io(format!("failed to replace {label} file '{file_name}': {error}"))
    })
}

/// Removes a file, treating an absent file as success.
pub(crate) fn remove_if_present(dir: &Dir, file_name: &str, label: &str) -> Result<(), StorageError> {
    match dir.remove_file(file_name) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(StorageError::io(format!(
            "failed to delete {label} '{file_name}': {error}"
        ))),
    }
}
