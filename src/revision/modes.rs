//! Prompt configuration document and the revision mode catalogue.
//!
//! The configuration document carries the base protocol template, the
//! built-in modes, the term-protection instruction, and the pricing table.
//! A default document is embedded in the binary; a JSON file on disk may
//! replace it. Custom modes authored by the user live in settings and are
//! consulted after the built-ins.

use std::collections::BTreeMap;
use std::fmt;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::cost::PricingTable;
use crate::storage;

use super::error::RevisionError;

const BUILTIN_PROMPTS: &str = include_str!("prompts.json");

/// Placeholder substituted with the selected dialect.
pub const DIALECT_PLACEHOLDER: &str = "{{DIALECT}}";

/// Lowest temperature a mode may request.
pub const MIN_TEMPERATURE: f64 = 0.0;

/// Highest temperature a mode may request.
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Settings shared by built-in and custom modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeDefinition {
    /// Short human-readable name.
    pub label: String,
    /// One-line summary shown when listing modes.
    #[serde(default)]
    pub description: String,
    /// Field-specific instruction appended to the base protocol.
    pub system_instruction: String,
    /// Sampling temperature sent with the completion request.
    pub temperature: f64,
}

/// User-authored mode persisted in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMode {
    /// Identifier used to select the mode.
    pub id: String,
    /// Mode content.
    #[serde(flatten)]
    pub definition: ModeDefinition,
}

impl CustomMode {
    /// Builds a validated custom mode.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] when the identifier, label, or
    /// instruction is blank, or the temperature lies outside `0.0..=2.0`.
    pub fn new(id: impl Into<String>, definition: ModeDefinition) -> Result<Self, RevisionError> {
        let mode = Self {
            id: id.into(),
            definition,
        };
        mode.validate()?;
        Ok(mode)
    }

    /// Checks the invariants enforced by [`CustomMode::new`].
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Validation`] describing the first violation.
    pub fn validate(&self) -> Result<(), RevisionError> {
        if self.id.trim().is_empty() {
            return Err(RevisionError::validation("custom mode id must not be empty"));
        }
        if self.definition.label.trim().is_empty() {
            return Err(RevisionError::validation(
                "custom mode label must not be empty",
            ));
        }
        if self.definition.system_instruction.trim().is_empty() {
            return Err(RevisionError::validation(
                "custom mode instruction must not be empty",
            ));
        }
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.definition.temperature) {
            return Err(RevisionError::validation(format!(
                "custom mode temperature must be between {MIN_TEMPERATURE} and \
                 {MAX_TEMPERATURE}, got {}",
                self.definition.temperature
            )));
        }
        Ok(())
    }
}

/// Term-protection section of the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatexProtection {
    /// Instruction appended when term protection is enabled.
    pub system_instruction: String,
}

/// Parsed prompt configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Base system prompt containing [`DIALECT_PLACEHOLDER`].
    pub base_protocol: String,
    /// Built-in modes keyed by identifier.
    pub modes: BTreeMap<String, ModeDefinition>,
    /// Optional term-protection instruction.
    #[serde(default)]
    pub latex_protection: Option<LatexProtection>,
    /// Pricing table used by the cost estimator.
    #[serde(default)]
    pub cost_estimates: PricingTable,
}

impl PromptConfig {
    /// Parses the document embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] if the embedded JSON is
    /// invalid.
    pub fn builtin() -> Result<Self, RevisionError> {
        Self::from_json(BUILTIN_PROMPTS, "built-in prompt configuration")
    }

    /// Loads `path` when given, otherwise the embedded document.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] when the file is missing,
    /// unreadable, or invalid.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, RevisionError> {
        let Some(prompts_path) = path else {
            return Self::builtin();
        };

        let content = storage::read_optional(prompts_path, "prompt configuration")
            .map_err(|error| RevisionError::configuration(error.to_string()))?
            .ok_or_else(|| {
                RevisionError::configuration(format!(
                    "prompt configuration '{prompts_path}' does not exist"
                ))
            })?;
        Self::from_json(&content, prompts_path.as_str())
    }

    /// Parses a configuration document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] when the JSON is invalid or
    /// names no modes.
    pub fn from_json(content: &str, source: &str) -> Result<Self, RevisionError> {
        let config: Self = serde_json::from_str(content).map_err(|error| {
            RevisionError::configuration(format!("failed to parse {source}: {error}"))
        })?;
        if config.modes.is_empty() {
            return Err(RevisionError::configuration(format!(
                "{source} defines no modes"
            )));
        }
        Ok(config)
    }

    /// Term-protection instruction, when configured.
    #[must_use]
    pub fn protection_instruction(&self) -> Option<&str> {
        self.latex_protection
            .as_ref()
            .map(|section| section.system_instruction.as_str())
    }
}

/// Where a mode was defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    /// Shipped in the configuration document.
    BuiltIn,
    /// Authored by the user and stored in settings.
    Custom,
}

/// A resolved mode with its identifier and origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    id: String,
    kind: ModeKind,
    definition: ModeDefinition,
}

impl Mode {
    /// Mode identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the mode came from.
    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        self.kind
    }

    /// Human-readable name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.definition.label
    }

    /// Field-specific instruction.
    #[must_use]
    pub fn system_instruction(&self) -> &str {
        &self.definition.system_instruction
    }

    /// Sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.definition.temperature
    }

    /// One-line description for listings.
    #[must_use]
    pub fn describe(&self) -> String {
        let suffix = match self.kind {
            ModeKind::BuiltIn => "",
            ModeKind::Custom => " (custom)",
        };
        if self.definition.description.is_empty() {
            format!("{}: {}{suffix}", self.id, self.definition.label)
        } else {
            format!(
                "{}: {} - {}{suffix}",
                self.id, self.definition.label, self.definition.description
            )
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.definition.label)
    }
}

/// Lookup view over built-in and custom modes.
#[derive(Debug, Clone, Copy)]
pub struct ModeCatalog<'a> {
    config: &'a PromptConfig,
    custom: &'a [CustomMode],
}

impl<'a> ModeCatalog<'a> {
    /// Creates a catalogue over the document and the user's custom modes.
    #[must_use]
    pub const fn new(config: &'a PromptConfig, custom: &'a [CustomMode]) -> Self {
        Self { config, custom }
    }

    /// Finds a mode by identifier, preferring built-ins.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<Mode> {
        if let Some(definition) = self.config.modes.get(id) {
            return Some(Mode {
                id: id.to_owned(),
                kind: ModeKind::BuiltIn,
                definition: definition.clone(),
            });
        }
        self.custom.iter().find(|mode| mode.id == id).map(|mode| Mode {
            id: mode.id.clone(),
            kind: ModeKind::Custom,
            definition: mode.definition.clone(),
        })
    }

    /// Finds a mode or reports the identifiers that are available.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::Configuration`] for an unknown identifier.
    pub fn resolve(&self, id: &str) -> Result<Mode, RevisionError> {
        self.lookup(id).ok_or_else(|| {
            let known = self.ids().collect::<Vec<_>>().join(", ");
            RevisionError::configuration(format!("unknown mode '{id}' (available: {known})"))
        })
    }

    /// Whether `id` names a built-in mode.
    #[must_use]
    pub fn is_builtin(&self, id: &str) -> bool {
        self.config.modes.contains_key(id)
    }

    /// Every reachable mode: built-ins in key order, then custom modes.
    #[must_use]
    pub fn modes(&self) -> Vec<Mode> {
        self.ids().filter_map(|id| self.lookup(id)).collect()
    }

    fn ids(&self) -> impl Iterator<Item = &'a str> {
        let config = self.config;
        let custom = self.custom;
        config.modes.keys().map(String::as_str).chain(
            custom
                .iter()
                .map(|mode| mode.id.as_str())
                .filter(move |id| !config.modes.contains_key(*id)),
        )
    }
}
