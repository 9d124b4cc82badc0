//! Paragraph-aligned chunking for documents that exceed the model budget.

use std::sync::LazyLock;

use regex::Regex;

/// Separator placed between paragraphs inside and between chunks.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Default per-request token budget for a single chunk.
pub const DEFAULT_CHUNK_TOKEN_BUDGET: usize = 3_000;

static PARAGRAPH_BREAK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").ok());

/// Cheap token estimate: `ceil(chars / 4)`.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Splits `text` on blank-line boundaries, dropping empty paragraphs.
#[must_use]
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let pieces: Vec<&str> = PARAGRAPH_BREAK.as_ref().map_or_else(
        || text.split(PARAGRAPH_SEPARATOR).collect(),
        |paragraph_break| paragraph_break.split(text).collect(),
    );
    pieces
        .into_iter()
        .filter(|paragraph| !paragraph.trim().is_empty())
        .collect()
}

/// Groups paragraphs into chunks whose estimate stays within `max_tokens`.
///
/// A paragraph that alone exceeds the budget still becomes its own chunk;
/// paragraphs are never split.
#[must_use]
pub fn chunk(text: &str, max_tokens: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in split_paragraphs(text) {
        if current.is_empty() {
            current.push_str(paragraph);
            continue;
        }

        if joined_estimate(&current, paragraph) > max_tokens {
            chunks.push(std::mem::take(&mut current));
            current.push_str(paragraph);
        } else {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(paragraph);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Estimate for `current` with `paragraph` appended after a separator.
fn joined_estimate(current: &str, paragraph: &str) -> usize {
    let joined_chars = current.chars().count()
        + PARAGRAPH_SEPARATOR.chars().count()
        + paragraph.chars().count();
    joined_chars.div_ceil(CHARS_PER_TOKEN)
}

/// Returns the units a document is revised in.
///
/// Documents within budget are revised as a single unit exactly as given;
/// longer documents are chunked.
#[must_use]
pub fn plan_chunks(text: &str, max_tokens: usize) -> Vec<String> {
    if estimate_tokens(text) <= max_tokens {
        return vec![text.to_owned()];
    }

    let chunks = chunk(text, max_tokens);
    tracing::debug!(
        chunks = chunks.len(),
        estimated_tokens = estimate_tokens(text),
        max_tokens,
        "document split into chunks"
    );
    chunks
}

/// Joins revised chunks back into one document.
#[must_use]
pub fn reassemble(chunks: &[String]) -> String {
    chunks.join(PARAGRAPH_SEPARATOR)
}
