//! Server-sent event decoding for streamed completions.

use std::io::BufRead;
use std::iter::FusedIterator;

use serde::Deserialize;

use super::error::RevisionError;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Pull-based iterator over the text deltas of an event stream.
///
/// The iterator ends at `data: [DONE]` or end of input and stays ended.
/// Fragments that fail to decode, including lines that are not valid
/// UTF-8, are skipped. A read failure is yielded once as
/// [`RevisionError::Stream`].
#[derive(Debug)]
pub struct DeltaStream<R> {
    reader: R,
    line: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> DeltaStream<R> {
    /// Wraps a buffered reader positioned at the start of the stream.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            finished: false,
        }
    }

    fn decode_line(&mut self) -> Option<String> {
        let line = match std::str::from_utf8(&self.line) {
            Ok(line) => line,
            Err(error) => {
                tracing::debug!(%error, "skipping stream line that is not UTF-8");
                return None;
            }
        };
        let payload = line.trim().strip_prefix(DATA_PREFIX)?.trim_start();
        if payload == DONE_SENTINEL {
            self.finished = true;
            return None;
        }

        match serde_json::from_str::<StreamChunk>(payload) {
            Ok(chunk) => chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty()),
            Err(error) => {
                tracing::debug!(%error, "skipping malformed stream fragment");
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for DeltaStream<R> {
    type Item = Result<String, RevisionError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    if let Some(delta) = self.decode_line() {
                        return Some(Ok(delta));
                    }
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(RevisionError::Stream {
                        message: format!("failed to read completion stream: {error}"),
                    }));
                }
            }
        }
        None
    }
}

impl<R: BufRead> FusedIterator for DeltaStream<R> {}
