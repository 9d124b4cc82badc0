//! Domain models for revision requests and results.

use chrono::{DateTime, Utc};

/// Default dialect substituted into the base protocol.
pub const DEFAULT_DIALECT: &str = "US English";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default mode identifier.
pub const DEFAULT_MODE: &str = "standard";

/// One revision request as built from the current selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRequest {
    source_text: String,
    mode: String,
    dialect: String,
    model: String,
    latex_protect: bool,
}

impl RevisionRequest {
    /// Creates a request with term protection disabled.
    #[must_use]
    pub fn new(
        source_text: impl Into<String>,
        mode: impl Into<String>,
        dialect: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            mode: mode.into(),
            dialect: dialect.into(),
            model: model.into(),
            latex_protect: false,
        }
    }

    /// Enables or disables the term-protection instruction.
    #[must_use]
    pub const fn with_latex_protection(mut self, enabled: bool) -> Self {
        self.latex_protect = enabled;
        self
    }

    /// Text to revise.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Selected mode identifier.
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Selected dialect.
    #[must_use]
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Selected model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the term-protection instruction is appended.
    #[must_use]
    pub const fn latex_protect(&self) -> bool {
        self.latex_protect
    }
}

/// Outcome of a successful revision.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionResult {
    /// Revised text with protected terms restored.
    pub polished_text: String,
    /// Estimated cost in US dollars.
    pub cost: f64,
    /// Completion time.
    pub timestamp: DateTime<Utc>,
    /// Attempts the retry controller needed.
    pub attempts: u32,
    /// Number of chunks the document was revised in.
    pub chunks: usize,
}
