//! Plain text exporter.

use std::io::Write;

use super::Exporter;
use super::error::ExportError;
use super::model::{ExportDocument, ExportFormat};

/// Writes the revised text, applying line numbering and double spacing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl Exporter for TextExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    fn write(&self, writer: &mut dyn Write, document: &ExportDocument<'_>) -> Result<(), ExportError> {
        let formatting = &document.metadata.formatting;
        let separator = if formatting.double_spaced { "\n\n" } else { "\n" };
        let width = document.polished.lines().count().to_string().len();

        let mut lines = document.polished.lines().enumerate().peekable();
        while let Some((index, line)) = lines.next() {
            if formatting.line_numbers {
                write!(writer, "{:>width$}  ", index.saturating_add(1))
                    .map_err(|error| ExportError::io(&error))?;
            }
            writer
                .write_all(line.as_bytes())
                .map_err(|error| ExportError::io(&error))?;
            if lines.peek().is_some() {
                writer
                    .write_all(separator.as_bytes())
                    .map_err(|error| ExportError::io(&error))?;
            }
        }
        writeln!(writer).map_err(|error| ExportError::io(&error))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::TextExporter;
    use crate::export::test_support::{document, render_to_string};
    use crate::export::{ExportMetadata, FormattingOptions};

    #[rstest]
    #[case::plain(false, false, "One.\nTwo.\n")]
    #[case::double_spaced(true, false, "One.\n\nTwo.\n")]
    #[case::numbered(false, true, "1  One.\n2  Two.\n")]
    #[case::both(true, true, "1  One.\n\n2  Two.\n")]
    fn applies_formatting(
        #[case] double_spaced: bool,
        #[case] line_numbers: bool,
        #[case] expected: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let metadata = ExportMetadata {
            formatting: FormattingOptions {
                double_spaced,
                line_numbers,
                font: None,
            },
            ..ExportMetadata::default()
        };

        let rendered = render_to_string(&TextExporter, &document("Draft", "One.\nTwo.", &metadata))?;

        assert_eq!(rendered, expected);
        Ok(())
    }

    #[test]
    fn numbers_are_right_aligned() -> Result<(), Box<dyn std::error::Error>> {
        let metadata = ExportMetadata {
            formatting: FormattingOptions {
                line_numbers: true,
                ..FormattingOptions::default()
            },
            ..ExportMetadata::default()
        };
        let text = (1..=10).map(|n| format!("L{n}")).collect::<Vec<_>>().join("\n");

        let rendered = render_to_string(&TextExporter, &document("", &text, &metadata))?;

        assert!(rendered.starts_with(" 1  L1\n"), "{rendered}");
        assert!(rendered.ends_with("10  L10\n"), "{rendered}");
        Ok(())
    }
}
