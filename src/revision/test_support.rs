//! Test-support doubles for revision flows.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::error::RevisionError;
use super::retry::Sleeper;
use super::service::{CompletionClient, CompletionRequest, ProgressObserver, RevisionProgress};

/// Identity model: answers every request with its own user text.
///
/// Streaming requests are answered one word at a time so observers see
/// several deltas.
#[derive(Debug, Default)]
pub struct EchoCompletionClient {
    requests: Mutex<Vec<CompletionRequest>>,
}

impl EchoCompletionClient {
    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CompletionClient for EchoCompletionClient {
    fn complete(
        &self,
        request: &CompletionRequest,
        observer: &mut dyn ProgressObserver,
    ) -> Result<String, RevisionError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if request.stream {
            for word in request.user_text.split_inclusive(' ') {
                observer.observe(&RevisionProgress::Delta(word.to_owned()));
            }
        }
        Ok(request.user_text.trim().to_owned())
    }

    fn verify_credentials(&self) -> Result<(), RevisionError> {
        Ok(())
    }
}

/// Replays a fixed script of responses, one per request.
///
/// Once the script is exhausted every further request fails with a
/// validation error naming the overrun.
#[derive(Debug, Default)]
pub struct ScriptedCompletionClient {
    responses: Mutex<VecDeque<Result<String, RevisionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    credentials: Option<RevisionError>,
}

impl ScriptedCompletionClient {
    /// Creates a client that answers with `responses` in order.
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = Result<String, RevisionError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            credentials: None,
        }
    }

    /// Makes [`CompletionClient::verify_credentials`] fail with `error`.
    #[must_use]
    pub fn with_rejected_credentials(mut self, error: RevisionError) -> Self {
        self.credentials = Some(error);
        self
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CompletionClient for ScriptedCompletionClient {
    fn complete(
        &self,
        request: &CompletionRequest,
        _observer: &mut dyn ProgressObserver,
    ) -> Result<String, RevisionError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(RevisionError::validation(
                    "scripted completion client has no response left",
                ))
            })
    }

    fn verify_credentials(&self) -> Result<(), RevisionError> {
        self.credentials.clone().map_or(Ok(()), Err)
    }
}

/// [`Sleeper`] that records requested pauses instead of blocking.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Pauses requested so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}
