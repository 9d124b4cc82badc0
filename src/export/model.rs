//! Export formats, document metadata, and the revision being exported.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ExportError;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Plain text with optional line numbers and double spacing.
    Text,
    /// Markdown document with front matter.
    Markdown,
    /// JSON carrying both versions and revision metadata.
    Json,
    /// Letter-sized PDF with page numbers.
    Pdf,
    /// Word-processing document.
    Docx,
}

impl ExportFormat {
    /// Conventional file extension for the format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            "docx" | "word" => Ok(Self::Docx),
            _ => Err(ExportError::UnsupportedFormat {
                format: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
        }
    }
}

/// Layout options honoured by exporters that support them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingOptions {
    /// Separate lines with a blank line.
    pub double_spaced: bool,
    /// Prefix each line with its number.
    pub line_numbers: bool,
    /// Preferred font for writers producing typeset output.
    pub font: Option<String>,
}

/// Font families typeset exporters can render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontFamily {
    /// Times.
    #[default]
    Serif,
    /// Helvetica or Arial.
    SansSerif,
    /// Courier.
    Monospace,
}

impl FontFamily {
    /// Maps a user-supplied font name onto a family; unknown names fall
    /// back to [`FontFamily::Serif`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "times" | "times new roman" | "times-roman" | "serif" => Self::Serif,
            "arial" | "calibri" | "helvetica" | "sans" | "sans-serif" => Self::SansSerif,
            "courier" | "courier new" | "mono" | "monospace" => Self::Monospace,
            other => {
                tracing::warn!(font = other, "unknown export font; using Times");
                Self::Serif
            }
        }
    }

    /// Font name written into word-processing documents.
    #[must_use]
    pub const fn document_name(self) -> &'static str {
        match self {
            Self::Serif => "Times New Roman",
            Self::SansSerif => "Arial",
            Self::Monospace => "Courier New",
        }
    }
}

impl FormattingOptions {
    /// Font family requested by [`FormattingOptions::font`].
    #[must_use]
    pub fn font_family(&self) -> FontFamily {
        self.font
            .as_deref()
            .map_or(FontFamily::Serif, FontFamily::from_name)
    }
}

/// Document metadata collected before exporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportMetadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Layout options.
    pub formatting: FormattingOptions,
}

/// A finished revision ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument<'a> {
    /// Text the revision started from.
    pub original: &'a str,
    /// Revised text.
    pub polished: &'a str,
    /// Mode identifier used for the revision.
    pub mode: &'a str,
    /// Model identifier used for the revision.
    pub model: &'a str,
    /// Dialect used for the revision.
    pub dialect: &'a str,
    /// When the revision finished.
    pub timestamp: DateTime<Utc>,
    /// Document metadata.
    pub metadata: &'a ExportMetadata,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ExportFormat, FontFamily, FormattingOptions};
    use crate::export::ExportError;

    #[rstest]
    #[case("text", ExportFormat::Text)]
    #[case("TXT", ExportFormat::Text)]
    #[case("md", ExportFormat::Markdown)]
    #[case("Markdown", ExportFormat::Markdown)]
    #[case("json", ExportFormat::Json)]
    #[case("PDF", ExportFormat::Pdf)]
    #[case("docx", ExportFormat::Docx)]
    fn parses_supported_formats(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>(), Ok(expected));
    }

    #[rstest]
    #[case("rtf")]
    #[case("odt")]
    fn rejects_unsupported_formats(#[case] input: &str) {
        assert_eq!(
            input.parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat {
                format: input.to_owned()
            })
        );
    }

    #[rstest]
    #[case(None, FontFamily::Serif)]
    #[case(Some("times"), FontFamily::Serif)]
    #[case(Some("Arial"), FontFamily::SansSerif)]
    #[case(Some("calibri"), FontFamily::SansSerif)]
    #[case(Some("Courier New"), FontFamily::Monospace)]
    #[case(Some("Comic Sans"), FontFamily::Serif)]
    fn resolves_font_families(#[case] font: Option<&str>, #[case] expected: FontFamily) {
        let options = FormattingOptions {
            font: font.map(str::to_owned),
            ..FormattingOptions::default()
        };

        assert_eq!(options.font_family(), expected);
    }
}
