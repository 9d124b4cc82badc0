//! Reversible term protection applied around every completion round trip.
//!
//! Dictionary terms are swapped for opaque placeholder tokens before text
//! leaves the process and swapped back once the model has answered. Tokens
//! take the form `[[PROTECTED_TERM_<n>]]`; the closing brackets guarantee that
//! no token is a substring of another, so restoration order cannot corrupt a
//! neighbouring token.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::error::RevisionError;

/// One user-designated term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Term to protect. Matching is case-insensitive.
    pub term: String,
    /// Text substituted on restore; `None` keeps the original casing.
    #[serde(default)]
    pub replacement: Option<String>,
}

impl DictionaryEntry {
    /// Creates an entry that preserves the matched text verbatim.
    #[must_use]
    pub fn preserve(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            replacement: None,
        }
    }

    /// Creates an entry that swaps the term for `replacement` on restore.
    #[must_use]
    pub fn replace_with(term: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            replacement: Some(replacement.into()),
        }
    }
}

/// Ordered collection of protected terms with unique, non-empty keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a dictionary, validating every entry in order.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] for a blank or duplicate term.
    pub fn from_entries(
        entries: impl IntoIterator<Item = DictionaryEntry>,
    ) -> Result<Self, RevisionError> {
        let mut dictionary = Self::new();
        for entry in entries {
            dictionary.push(entry)?;
        }
        Ok(dictionary)
    }

    /// Appends a term to the end of the dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] when the term is blank or
    /// already present (case-sensitive comparison).
    pub fn add(
        &mut self,
        term: impl Into<String>,
        replacement: Option<String>,
    ) -> Result<(), RevisionError> {
        self.push(DictionaryEntry {
            term: term.into(),
            replacement,
        })
    }

    fn push(&mut self, entry: DictionaryEntry) -> Result<(), RevisionError> {
        if entry.term.trim().is_empty() {
            return Err(RevisionError::validation(
                "dictionary terms must not be empty",
            ));
        }
        if self.contains(&entry.term) {
            return Err(RevisionError::validation(format!(
                "dictionary already contains the term '{}'",
                entry.term
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Removes a term, returning whether it was present.
    pub fn remove(&mut self, term: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.term != term);
        self.entries.len() != before
    }

    /// Whether `term` is already a key (case-sensitive).
    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.entries.iter().any(|entry| entry.term == term)
    }

    /// Entries in dictionary order.
    #[must_use]
    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Placeholder token for the entry at `index`.
#[must_use]
pub fn placeholder_token(index: usize) -> String {
    format!("[[PROTECTED_TERM_{index}]]")
}

/// Matches recorded for one placeholder token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProtectedTerm {
    token: String,
    entry: DictionaryEntry,
    matches: Vec<String>,
}

impl ProtectedTerm {
    fn restoration(&self, occurrence: usize) -> &str {
        if let Some(replacement) = self.entry.replacement.as_deref() {
            return replacement;
        }
        self.matches
            .get(occurrence)
            .map_or(self.entry.term.as_str(), String::as_str)
    }
}

/// Per-call mapping from placeholder tokens back to the protected text.
///
/// [`restore`] consumes the mapping, so each mapping is used exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMapping {
    terms: Vec<ProtectedTerm>,
}

impl TokenMapping {
    /// Number of distinct tokens that were substituted.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether protection substituted nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Literal matches recorded for `token`, in encounter order.
    #[must_use]
    pub fn matches_for(&self, token: &str) -> Option<&[String]> {
        self.terms
            .iter()
            .find(|term| term.token == token)
            .map(|term| term.matches.as_slice())
    }
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Token(usize),
}

/// Text after protection together with the mapping needed to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    /// Text with every dictionary occurrence replaced by its token.
    pub text: String,
    /// Mapping consumed by [`restore`].
    pub mapping: TokenMapping,
}

/// Replaces every case-insensitive dictionary occurrence with its token.
///
/// Entries run in dictionary order over the output of the previous entry.
/// Text already claimed by an earlier entry's token is never rematched, so
/// earlier entries win overlapping spans.
///
/// # Errors
///
/// Returns [`RevisionError::Validation`] when a term cannot be compiled into
/// a matcher.
pub fn protect(text: &str, dictionary: &Dictionary) -> Result<ProtectedText, RevisionError> {
    let mut segments = vec![Segment::Literal(text.to_owned())];
    let mut terms = Vec::new();

    for (index, entry) in dictionary.entries().iter().enumerate() {
        let matcher = term_matcher(&entry.term)?;
        let mut matches = Vec::new();
        segments = segments
            .into_iter()
            .flat_map(|segment| split_segment(segment, index, &matcher, &mut matches))
            .collect();

        if !matches.is_empty() {
            terms.push(ProtectedTerm {
                token: placeholder_token(index),
                entry: entry.clone(),
                matches,
            });
        }
    }

    let protected = segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(literal) => literal.clone(),
            Segment::Token(index) => placeholder_token(*index),
        })
        .collect();

    Ok(ProtectedText {
        text: protected,
        mapping: TokenMapping { terms },
    })
}

fn term_matcher(term: &str) -> Result<Regex, RevisionError> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map_err(|error| {
            RevisionError::validation(format!("dictionary term '{term}' is not usable: {error}"))
        })
}

fn split_segment(
    segment: Segment,
    index: usize,
    matcher: &Regex,
    matches: &mut Vec<String>,
) -> Vec<Segment> {
    let Segment::Literal(literal) = segment else {
        return vec![segment];
    };

    let mut pieces = matcher.split(&literal);
    let mut output = Vec::new();
    for found in matcher.find_iter(&literal) {
        if let Some(before) = pieces.next().filter(|piece| !piece.is_empty()) {
            output.push(Segment::Literal(before.to_owned()));
        }
        output.push(Segment::Token(index));
        matches.push(found.as_str().to_owned());
    }
    if let Some(rest) = pieces.next().filter(|piece| !piece.is_empty()) {
        output.push(Segment::Literal(rest.to_owned()));
    }
    output
}

/// Replaces every placeholder token in `text` with its protected value.
///
/// Tokens are restored in ascending entry order. Each occurrence, left to
/// right, receives the configured replacement or otherwise the matching
/// recorded original. Occurrences beyond the recorded count fall back to the
/// bare dictionary term.
#[must_use]
pub fn restore(text: &str, mapping: TokenMapping) -> String {
    mapping
        .terms
        .into_iter()
        .fold(text.to_owned(), |current, term| restore_term(&current, &term))
}

fn restore_term(text: &str, term: &ProtectedTerm) -> String {
    let mut pieces = text.split(term.token.as_str());
    let mut restored = String::with_capacity(text.len());
    if let Some(first) = pieces.next() {
        restored.push_str(first);
    }
    for (occurrence, piece) in pieces.enumerate() {
        restored.push_str(term.restoration(occurrence));
        restored.push_str(piece);
    }
    restored
}

#[cfg(test)]
#[path = "protect_tests.rs"]
mod tests;
