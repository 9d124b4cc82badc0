//! Export of finished revisions.
//!
//! # Supported Formats
//!
//! - **Text**: the revised text, optionally line numbered and double spaced
//! - **Markdown**: a templated document with YAML front matter
//! - **JSON**: both versions of the text with revision metadata
//! - **PDF**: a paginated US Letter document with page footers
//! - **DOCX**: a word-processing document
//!
//! The text and typeset writers honour [`FormattingOptions`]: double spacing,
//! line numbering, and the font family.

mod docx;
mod error;
mod json;
mod layout;
mod markdown;
mod model;
mod pdf;
mod text;

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::storage::{open_or_create_dir, split_path, write_atomic};

pub use docx::DocxExporter;
pub use error::ExportError;
pub use json::JsonExporter;
pub use markdown::{DEFAULT_MARKDOWN_TEMPLATE, MarkdownExporter};
pub use model::{ExportDocument, ExportFormat, ExportMetadata, FontFamily, FormattingOptions};
pub use pdf::PdfExporter;
pub use text::TextExporter;

/// Serialises a finished revision in one format.
pub trait Exporter: std::fmt::Debug {
    /// Format produced by this exporter.
    fn format(&self) -> ExportFormat;

    /// Writes `document` to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when rendering or writing fails.
    fn write(&self, writer: &mut dyn Write, document: &ExportDocument<'_>) -> Result<(), ExportError>;
}

/// Returns the built-in exporter for `format`.
#[must_use]
pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Text => Box::new(TextExporter),
        ExportFormat::Markdown => Box::new(MarkdownExporter::default()),
        ExportFormat::Json => Box::new(JsonExporter),
        ExportFormat::Pdf => Box::new(PdfExporter),
        ExportFormat::Docx => Box::new(DocxExporter),
    }
}

/// Renders `document` and writes it atomically to `path`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`ExportError`] when rendering fails or the file cannot be
/// written.
pub fn export_to_path(
    exporter: &dyn Exporter,
    document: &ExportDocument<'_>,
    path: &Utf8Path,
) -> Result<Utf8PathBuf, ExportError> {
    let mut buffer = Vec::new();
    exporter.write(&mut buffer, document)?;

    let (parent, file_name) = split_path(path, "export")?;
    let dir = open_or_create_dir(parent, "export")?;
    write_atomic(&dir, file_name, &buffer, "export")?;
    tracing::info!(%path, format = %exporter.format(), "exported revision");
    Ok(path.to_path_buf())
}
