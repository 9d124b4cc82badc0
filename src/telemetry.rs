//! Revision telemetry events and sinks.
//!
//! Events are local only: the stderr sink writes them as JSON lines for
//! debugging and nothing is transmitted anywhere.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by a revision session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A revision finished and was recorded in history.
    RevisionCompleted {
        /// Mode identifier.
        mode: String,
        /// Model identifier.
        model: String,
        /// Number of chunks sent.
        chunks: usize,
        /// Attempts used, including the successful one.
        attempts: u32,
        /// Characters submitted.
        input_chars: usize,
        /// Characters received.
        output_chars: usize,
        /// Estimated cost in US dollars.
        cost_usd: f64,
    },
    /// A failed attempt is about to be retried.
    RevisionRetried {
        /// Attempt about to start.
        attempt: u32,
        /// Attempt limit.
        max_attempts: u32,
        /// Error that caused the retry.
        reason: String,
    },
    /// A revision failed terminally.
    RevisionFailed {
        /// Mode identifier.
        mode: String,
        /// Model identifier.
        model: String,
        /// Error reported to the user.
        error: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync + std::fmt::Debug {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Sink that keeps every event in memory.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingTelemetrySink {
    events: std::sync::Mutex<Vec<TelemetryEvent>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingTelemetrySink {
    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TelemetrySink for RecordingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}
