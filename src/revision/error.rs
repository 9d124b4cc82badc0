//! Error types surfaced by the revision pipeline.

use thiserror::Error;

use crate::storage::StorageError;

/// Generic marker used when the completion endpoint supplies no message.
pub const GENERIC_FAILURE_MESSAGE: &str = "API request failed";

/// Errors raised while building, sending, or reassembling a revision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RevisionError {
    /// Input was rejected before any network traffic took place.
    #[error("{message}")]
    Validation {
        /// User-readable description of the rejected input.
        message: String,
    },

    /// Required configuration (API key, mode, prompt document) is missing.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The HTTP transport failed before a response was received.
    #[error("network error talking to the completion endpoint: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The completion endpoint answered with a non-success status.
    #[error("completion endpoint returned status {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or [`GENERIC_FAILURE_MESSAGE`].
        message: String,
    },

    /// A response body could not be decoded into revision text.
    #[error("completion response could not be decoded: {message}")]
    Stream {
        /// Decoder error detail.
        message: String,
    },

    /// Local persistence failed while the revision was being recorded.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Every retry attempt failed.
    #[error(
        "revision failed after {attempts} attempts: {last_error}. \
         Your original text was saved as a draft backup{backup_hint}; \
         restore it with --restore-backup and try again"
    )]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error reported by the final attempt.
        last_error: Box<Self>,
        /// Location of the draft backup, prefixed for display.
        backup_hint: String,
    },
}

impl RevisionError {
    /// Builds a validation error from a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Builds a configuration error from a message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Points an exhausted-retries error at the saved draft backup.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_backup_hint(self, hint: impl Into<String>) -> Self {
        match self {
            Self::RetriesExhausted {
                attempts,
                last_error,
                ..
            } => Self::RetriesExhausted {
                attempts,
                last_error,
                backup_hint: hint.into(),
            },
            other => other,
        }
    }

    /// Whether the retry controller should attempt the operation again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Server { .. } | Self::Stream { .. }
        )
    }
}
