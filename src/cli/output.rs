//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use scholardraft::revision::{Dictionary, Mode, RevisionProgress, RevisionResult};
use scholardraft::storage::{DraftBackup, Settings};
use scholardraft::text_stats::{improvement_percent, word_count};

use super::CliError;

/// Converts an I/O error into a [`CliError`].
pub fn io_error(error: &io::Error) -> CliError {
    CliError::Io {
        message: error.to_string(),
    }
}

/// Writes the revised text followed by a one-line summary.
pub fn write_revision_to<W: Write>(
    writer: &mut W,
    original: &str,
    result: &RevisionResult,
) -> Result<(), CliError> {
    writeln!(writer, "{}", result.polished_text).map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(
        writer,
        "Words: {} -> {} | Changed: {}% | Cost: ${:.4} | Chunks: {} | Attempts: {}",
        word_count(original),
        word_count(&result.polished_text),
        improvement_percent(original, &result.polished_text),
        result.cost,
        result.chunks,
        result.attempts
    )
    .map_err(|e| io_error(&e))
}

/// Writes the running totals.
pub fn write_totals_to<W: Write>(writer: &mut W, settings: &Settings) -> Result<(), CliError> {
    writeln!(
        writer,
        "Total polishes: {} | Total spent: ${:.4}",
        settings.total_polishes, settings.total_spent
    )
    .map_err(|e| io_error(&e))
}

/// Writes one line per mode, marking the selected one.
pub fn write_modes_to<W: Write>(
    writer: &mut W,
    modes: &[Mode],
    selected: &str,
) -> Result<(), CliError> {
    for mode in modes {
        let marker = if mode.id() == selected { '*' } else { ' ' };
        writeln!(writer, "{marker} {}", mode.describe()).map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the protection dictionary.
pub fn write_terms_to<W: Write>(writer: &mut W, dictionary: &Dictionary) -> Result<(), CliError> {
    if dictionary.is_empty() {
        return writeln!(writer, "No protected terms.").map_err(|e| io_error(&e));
    }
    for entry in dictionary.entries() {
        let written = match entry.replacement.as_deref() {
            Some(replacement) => writeln!(writer, "{} -> {replacement}", entry.term),
            None => writeln!(writer, "{}", entry.term),
        };
        written.map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes the draft backup, or a note that none exists.
pub fn write_backup_to<W: Write>(
    writer: &mut W,
    backup: Option<&DraftBackup>,
) -> Result<(), CliError> {
    let Some(draft) = backup else {
        return writeln!(writer, "No draft backup found.").map_err(|e| io_error(&e));
    };
    writeln!(
        writer,
        "Draft saved {} (mode {}, model {}, {}):",
        draft.saved_at.to_rfc3339(),
        draft.mode,
        draft.model,
        draft.dialect
    )
    .map_err(|e| io_error(&e))?;
    writeln!(writer).map_err(|e| io_error(&e))?;
    writeln!(writer, "{}", draft.original_text).map_err(|e| io_error(&e))
}

/// Renders revision progress for the terminal.
///
/// Streamed deltas update a single counter line in place; the text itself
/// still carries protection placeholders and is not echoed.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    streamed_chars: usize,
    line_open: bool,
}

impl ProgressReporter {
    /// Writes the output for one progress event.
    pub fn write_to<W: Write>(&mut self, writer: &mut W, event: &RevisionProgress) -> io::Result<()> {
        match event {
            RevisionProgress::ChunkStarted { index, total } => {
                self.close_line(writer)?;
                self.streamed_chars = 0;
                if *total > 1 {
                    writeln!(writer, "Revising chunk {} of {total}...", index.saturating_add(1))?;
                }
                Ok(())
            }
            RevisionProgress::Delta(text) => {
                self.streamed_chars = self.streamed_chars.saturating_add(text.chars().count());
                self.line_open = true;
                write!(writer, "\rReceiving revision: {} characters", self.streamed_chars)?;
                writer.flush()
            }
            RevisionProgress::ChunkCompleted { .. } => self.close_line(writer),
            RevisionProgress::RetryScheduled {
                attempt,
                max_attempts,
                delay,
                reason,
            } => {
                self.close_line(writer)?;
                self.streamed_chars = 0;
                writeln!(
                    writer,
                    "{reason}; retrying (attempt {attempt} of {max_attempts}) in {}s",
                    delay.as_secs()
                )
            }
        }
    }

    /// Ends an unfinished counter line.
    pub fn finish<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close_line(writer)
    }

    fn close_line<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if !self.line_open {
            return Ok(());
        }
        self.line_open = false;
        writeln!(writer)
    }
}
