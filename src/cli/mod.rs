//! CLI operation mode handlers.
//!
//! This module contains the implementations for the operation modes:
//! - [`revise`]: Revise text and optionally export it
//! - [`estimate`]: Print the pre-submission cost estimate
//! - [`credentials`]: Store, delete, and verify the API key
//! - [`dictionary`]: Maintain the protection dictionary
//! - [`maintenance`]: List modes, reset totals, and show the draft backup
//!
//! Session construction lives in [`context`] and output formatting
//! utilities are in [`output`].

use scholardraft::RevisionError;
use scholardraft::export::ExportError;
use scholardraft::storage::StorageError;
use thiserror::Error;

pub mod context;
pub mod credentials;
pub mod dictionary;
pub mod estimate;
pub mod input;
pub mod maintenance;
pub mod output;
pub mod revise;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Revision, configuration, or session failure.
    #[error(transparent)]
    Revision(#[from] RevisionError),

    /// Export failure.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// Writing to the terminal or reading input failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail.
        message: String,
    },
}

impl From<StorageError> for CliError {
    fn from(error: StorageError) -> Self {
        Self::Revision(RevisionError::Storage(error))
    }
}
