//! Body text layout shared by the typeset exporters.

use crate::revision::split_paragraphs;

/// One source line of body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BodyLine<'a> {
    /// One-based line number across the whole document.
    pub number: usize,
    /// Trimmed line text.
    pub text: &'a str,
    /// Whether the line closes its paragraph.
    pub ends_paragraph: bool,
}

/// Splits `text` into numbered, trimmed source lines.
///
/// Blank-line boundaries separate paragraphs; lines left empty after
/// trimming are dropped and do not consume a number.
#[must_use]
pub(crate) fn body_lines(text: &str) -> Vec<BodyLine<'_>> {
    let mut lines = Vec::new();
    for paragraph in split_paragraphs(text) {
        let mut source = paragraph
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .peekable();
        while let Some(line) = source.next() {
            lines.push(BodyLine {
                number: lines.len().saturating_add(1),
                text: line,
                ends_paragraph: source.peek().is_none(),
            });
        }
    }
    lines
}

/// Greedy word wrap to at most `width` characters per line.
///
/// A word longer than `width` occupies a line of its own.
#[must_use]
pub(crate) fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_len = 0_usize;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len.saturating_add(1).saturating_add(word_len) > width {
            wrapped.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len = current_len.saturating_add(1);
        }
        current.push_str(word);
        current_len = current_len.saturating_add(word_len);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}
