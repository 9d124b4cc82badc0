//! Completion client contract and progress reporting.

use std::time::Duration;

use super::error::RevisionError;

/// Default completion length limit.
pub const DEFAULT_MAX_TOKENS: u32 = 4_000;

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Assembled system prompt.
    pub system_prompt: String,
    /// Protected user text for this chunk.
    pub user_text: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion length limit.
    pub max_tokens: u32,
    /// Whether to request a server-sent event stream.
    pub stream: bool,
}

/// Progress reported while a revision runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionProgress {
    /// A chunk is about to be sent.
    ChunkStarted {
        /// Zero-based chunk index.
        index: usize,
        /// Total chunks in this attempt.
        total: usize,
    },
    /// Streamed text arrived.
    Delta(String),
    /// A chunk finished.
    ChunkCompleted {
        /// Zero-based chunk index.
        index: usize,
        /// Total chunks in this attempt.
        total: usize,
    },
    /// A failed attempt will be retried after `delay`.
    RetryScheduled {
        /// One-based number of the upcoming attempt.
        attempt: u32,
        /// Attempt limit.
        max_attempts: u32,
        /// Backoff before the next attempt.
        delay: Duration,
        /// Error that triggered the retry.
        reason: String,
    },
}

/// Receives [`RevisionProgress`] between stream pulls.
pub trait ProgressObserver {
    /// Handles one progress event.
    fn observe(&mut self, event: &RevisionProgress);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&RevisionProgress),
{
    fn observe(&mut self, event: &RevisionProgress) {
        self(event);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn observe(&mut self, _event: &RevisionProgress) {}
}

/// Remote model contract used by the revision pipeline.
pub trait CompletionClient: Send + Sync + std::fmt::Debug {
    /// Sends one completion request and returns the trimmed reply.
    ///
    /// Streaming requests report every delta to `observer` as it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] when no API key is set, and
    /// [`RevisionError::Network`], [`RevisionError::Server`], or
    /// [`RevisionError::Stream`] when the call fails.
    fn complete(
        &self,
        request: &CompletionRequest,
        observer: &mut dyn ProgressObserver,
    ) -> Result<String, RevisionError>;

    /// Checks that the configured credentials are accepted.
    ///
    /// # Errors
    ///
    /// Returns the same error classes as [`CompletionClient::complete`].
    fn verify_credentials(&self) -> Result<(), RevisionError>;
}
