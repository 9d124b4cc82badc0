//! Token-level comparison of an original and a revised text.
//!
//! [`diff`] aligns word, whitespace, and punctuation tokens and tidies the
//! result into readable change regions. [`render`] turns the edit script
//! into escaped markup. [`word_presence`] is the degraded comparison used
//! when no original text was recorded.

mod engine;
mod presence;
mod render;
mod tokenize;

pub use engine::diff;
pub use presence::word_presence;
pub use render::{ADDED_CLASS, REMOVED_CLASS, escape_html, render};

/// One operation of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp {
    /// Text present in both versions.
    Equal(String),
    /// Text present only in the revised version.
    Insert(String),
    /// Text present only in the original version.
    Delete(String),
}

impl DiffOp {
    /// Text carried by the operation.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Equal(text) | Self::Insert(text) | Self::Delete(text) => text,
        }
    }
}

/// Concatenates equal and deleted spans.
#[must_use]
pub fn original_side(ops: &[DiffOp]) -> String {
    ops.iter()
        .filter(|op| !matches!(op, DiffOp::Insert(_)))
        .map(DiffOp::text)
        .collect()
}

/// Concatenates equal and inserted spans.
#[must_use]
pub fn revised_side(ops: &[DiffOp]) -> String {
    ops.iter()
        .filter(|op| !matches!(op, DiffOp::Delete(_)))
        .map(DiffOp::text)
        .collect()
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
