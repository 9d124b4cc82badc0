//! Bounded, per-session history of revision results.

use std::collections::VecDeque;

use chrono::{SecondsFormat, Utc};

/// Number of versions retained before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 5;

/// One recorded revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Revised text.
    pub polished: String,
    /// Text the revision started from.
    pub original: String,
    /// Capture time in RFC 3339 form.
    pub timestamp: String,
    /// Position within the history, oldest first.
    pub index: usize,
}

/// Last [`HISTORY_CAPACITY`] revisions with a restorable current entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionHistory {
    entries: VecDeque<VersionEntry>,
    current: Option<usize>,
}

impl VersionHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            current: None,
        }
    }

    /// Records a revision, makes it current, and returns its index.
    ///
    /// When the history is full the oldest entry is evicted and the rest are
    /// renumbered from zero.
    pub fn push(&mut self, polished: impl Into<String>, original: impl Into<String>) -> usize {
        while self.entries.len() >= HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(VersionEntry {
            polished: polished.into(),
            original: original.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            index: 0,
        });
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.index = index;
        }

        let newest = self.entries.len().saturating_sub(1);
        self.current = Some(newest);
        newest
    }

    /// Makes the entry at `index` current.
    ///
    /// Returns `None` and leaves the history untouched when `index` is out
    /// of bounds.
    pub fn restore(&mut self, index: usize) -> Option<&VersionEntry> {
        let entry = self.entries.get(index)?;
        self.current = Some(index);
        Some(entry)
    }

    /// Entry most recently pushed or restored.
    #[must_use]
    pub fn current(&self) -> Option<&VersionEntry> {
        self.current.and_then(|index| self.entries.get(index))
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &VersionEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
