//! Error types for local persistence of settings, credentials, and backups.

use thiserror::Error;

/// Errors returned while reading or writing local application state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Neither an explicit data directory nor a home directory is available.
    #[error(
        "unable to resolve the data directory: set --data-dir, \
         SCHOLARDRAFT_DATA_DIR, XDG_DATA_HOME, or HOME"
    )]
    MissingDataDirectory,

    /// A filesystem operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Stored state could not be encoded or decoded.
    #[error("failed to (de)serialise {what}: {message}")]
    Serialisation {
        /// The kind of document involved, for example `settings`.
        what: &'static str,
        /// Error detail from `serde_json`.
        message: String,
    },
}

impl StorageError {
    /// Builds an I/O error from a message.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}
