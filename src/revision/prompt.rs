//! System prompt assembly from ordered fragments.

use super::modes::{DIALECT_PLACEHOLDER, Mode, PromptConfig};

const FRAGMENT_SEPARATOR: &str = "\n\n";
const FIELD_INSTRUCTIONS_HEADER: &str = "SPECIFIC FIELD INSTRUCTIONS:\n";

/// One contributor to the system prompt.
pub trait PromptFragment {
    /// Text contributed by the fragment, or `None` to contribute nothing.
    fn render(&self) -> Option<String>;
}

/// Base protocol with the dialect substituted.
#[derive(Debug, Clone, Copy)]
pub struct BaseProtocol<'a> {
    template: &'a str,
    dialect: &'a str,
}

impl<'a> BaseProtocol<'a> {
    /// Creates the fragment for `template` and `dialect`.
    #[must_use]
    pub const fn new(template: &'a str, dialect: &'a str) -> Self {
        Self { template, dialect }
    }
}

impl PromptFragment for BaseProtocol<'_> {
    fn render(&self) -> Option<String> {
        Some(self.template.replace(DIALECT_PLACEHOLDER, self.dialect))
    }
}

/// Field-specific instruction of the selected mode.
#[derive(Debug, Clone, Copy)]
pub struct ModeInstruction<'a> {
    mode: &'a Mode,
}

impl<'a> ModeInstruction<'a> {
    /// Creates the fragment for `mode`.
    #[must_use]
    pub const fn new(mode: &'a Mode) -> Self {
        Self { mode }
    }
}

impl PromptFragment for ModeInstruction<'_> {
    fn render(&self) -> Option<String> {
        Some(format!(
            "{FIELD_INSTRUCTIONS_HEADER}{}",
            self.mode.system_instruction()
        ))
    }
}

/// Term-protection instruction, present only when enabled and configured.
#[derive(Debug, Clone, Copy)]
pub struct ProtectionInstruction<'a> {
    instruction: Option<&'a str>,
    enabled: bool,
}

impl<'a> ProtectionInstruction<'a> {
    /// Creates the fragment.
    #[must_use]
    pub const fn new(instruction: Option<&'a str>, enabled: bool) -> Self {
        Self {
            instruction,
            enabled,
        }
    }
}

impl PromptFragment for ProtectionInstruction<'_> {
    fn render(&self) -> Option<String> {
        self.instruction
            .filter(|_| self.enabled)
            .map(ToOwned::to_owned)
    }
}

/// Joins fragments in order, separated by a blank line.
#[derive(Default)]
pub struct SystemPromptBuilder<'a> {
    fragments: Vec<Box<dyn PromptFragment + 'a>>,
}

impl<'a> SystemPromptBuilder<'a> {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Appends a fragment.
    #[must_use]
    pub fn with(mut self, fragment: impl PromptFragment + 'a) -> Self {
        self.fragments.push(Box::new(fragment));
        self
    }

    /// Standard pipeline: base protocol, mode instruction, protection.
    #[must_use]
    pub fn standard(
        config: &'a PromptConfig,
        mode: &'a Mode,
        dialect: &'a str,
        latex_protect: bool,
    ) -> Self {
        Self::new()
            .with(BaseProtocol::new(&config.base_protocol, dialect))
            .with(ModeInstruction::new(mode))
            .with(ProtectionInstruction::new(
                config.protection_instruction(),
                latex_protect,
            ))
    }

    /// Renders every contributing fragment.
    #[must_use]
    pub fn build(&self) -> String {
        self.fragments
            .iter()
            .filter_map(|fragment| fragment.render())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR)
    }
}
