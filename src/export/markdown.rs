//! Markdown document exporter driven by a Jinja2-compatible template.
//!
//! The default template emits YAML front matter followed by the title and
//! the revised text. A replacement template may be supplied; it sees:
//!
//! - `title`, `author`, `subject` (empty strings when unset)
//! - `mode`, `model`, `dialect`
//! - `generated_at` (RFC 3339)
//! - `word_count`
//! - `body` (the revised text)
//!
//! The `quote` filter renders a value as a double-quoted YAML scalar.

use std::io::Write;

use minijinja::{AutoEscape, Environment, context};

use super::Exporter;
use super::error::ExportError;
use super::model::{ExportDocument, ExportFormat};
use crate::text_stats::word_count;

const TEMPLATE_NAME: &str = "document";

/// Template used when none is supplied.
pub const DEFAULT_MARKDOWN_TEMPLATE: &str = "\
---
title: {{ title | quote }}
{% if author %}author: {{ author | quote }}
{% endif %}{% if subject %}subject: {{ subject | quote }}
{% endif %}mode: {{ mode | quote }}
model: {{ model | quote }}
dialect: {{ dialect | quote }}
date: {{ generated_at | quote }}
words: {{ word_count }}
---

# {{ title }}

{{ body }}
";

const UNTITLED: &str = "Polished Text";

/// Renders a Markdown document through a minijinja template.
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    template: String,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self::with_template(DEFAULT_MARKDOWN_TEMPLATE)
    }
}

impl MarkdownExporter {
    /// Uses `template` instead of [`DEFAULT_MARKDOWN_TEMPLATE`].
    #[must_use]
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    fn render(&self, document: &ExportDocument<'_>) -> Result<String, ExportError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("quote", yaml_quote);
        env.add_template(TEMPLATE_NAME, &self.template)
            .map_err(|error| ExportError::Template {
                message: format!("invalid template syntax: {error}"),
            })?;

        let metadata = document.metadata;
        let ctx = context! {
            title => metadata.title.as_deref().unwrap_or(UNTITLED),
            author => metadata.author.as_deref().unwrap_or_default(),
            subject => metadata.subject.as_deref().unwrap_or_default(),
            mode => document.mode,
            model => document.model,
            dialect => document.dialect,
            generated_at => document.timestamp.to_rfc3339(),
            word_count => word_count(document.polished),
            body => document.polished.trim_end(),
        };

        env.get_template(TEMPLATE_NAME)
            .and_then(|template| template.render(ctx))
            .map_err(|error| ExportError::Template {
                message: format!("template rendering failed: {error}"),
            })
    }
}

fn yaml_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len().saturating_add(2));
    quoted.push('"');
    for character in value.chars() {
        match character {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

impl Exporter for MarkdownExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Markdown
    }

    fn write(&self, writer: &mut dyn Write, document: &ExportDocument<'_>) -> Result<(), ExportError> {
        let rendered = self.render(document)?;
        writer
            .write_all(rendered.as_bytes())
            .map_err(|error| ExportError::io(&error))
    }
}

#[cfg(test)]
mod tests {
    use super::MarkdownExporter;
    use crate::export::test_support::{document, render_to_string};
    use crate::export::{ExportError, ExportMetadata};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn default_template_emits_front_matter() -> TestResult {
        let metadata = ExportMetadata {
            title: Some("On \"Method\"".to_owned()),
            author: Some("A. Scholar".to_owned()),
            ..ExportMetadata::default()
        };

        let rendered = render_to_string(
            &MarkdownExporter::default(),
            &document("Draft.", "Polished prose here.", &metadata),
        )?;

        insta::assert_snapshot!(rendered, @r#"
        ---
        title: "On \"Method\""
        author: "A. Scholar"
        mode: "standard"
        model: "gpt-4o-mini"
        dialect: "US English"
        date: "2026-03-01T09:30:00+00:00"
        words: 3
        ---

        # On "Method"

        Polished prose here.
        "#);
        Ok(())
    }

    #[test]
    fn untitled_documents_get_a_default_title() -> TestResult {
        let metadata = ExportMetadata::default();

        let rendered = render_to_string(
            &MarkdownExporter::default(),
            &document("", "Body.", &metadata),
        )?;

        assert!(rendered.contains("# Polished Text"), "{rendered}");
        assert!(!rendered.contains("author:"), "{rendered}");
        Ok(())
    }

    #[test]
    fn custom_templates_see_document_fields() -> TestResult {
        let exporter = MarkdownExporter::with_template("{{ dialect }}|{{ body }}");
        let metadata = ExportMetadata::default();

        let rendered = render_to_string(&exporter, &document("", "Text.", &metadata))?;

        assert_eq!(rendered, "US English|Text.");
        Ok(())
    }

    #[test]
    fn invalid_templates_are_template_errors() {
        let exporter = MarkdownExporter::with_template("{% if %}");
        let metadata = ExportMetadata::default();

        let result = render_to_string(&exporter, &document("", "Text.", &metadata));

        assert!(matches!(result, Err(ExportError::Template { .. })), "{result:?}");
    }
}
