//! Export error type.

use thiserror::Error;

use super::model::ExportFormat;
use crate::storage::StorageError;

/// Errors raised while exporting a revision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExportError {
    /// The requested format has no exporter.
    #[error(
        "unsupported export format '{format}': valid options are 'text', 'markdown', 'json', \
         'pdf', or 'docx'"
    )]
    UnsupportedFormat {
        /// Format name as given.
        format: String,
    },

    /// The document template could not be compiled or rendered.
    #[error("export template error: {message}")]
    Template {
        /// Template engine detail.
        message: String,
    },

    /// A typeset document could not be assembled.
    #[error("failed to build the {format} document: {message}")]
    Typesetting {
        /// Format being produced.
        format: ExportFormat,
        /// Backend detail.
        message: String,
    },

    /// Writing the export failed.
    #[error("export failed: {0}")]
    Storage(#[from] StorageError),
}

impl ExportError {
    pub(crate) fn io(error: &std::io::Error) -> Self {
        Self::Storage(StorageError::io(error.to_string()))
    }
}
