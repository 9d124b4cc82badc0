//! JSON exporter carrying both versions of the text.

use std::io::Write;

use serde::Serialize;

use super::Exporter;
use super::error::ExportError;
use super::model::{ExportDocument, ExportFormat};
use crate::text_stats::word_count;

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    original: &'a str,
    polished: &'a str,
    metadata: JsonMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct JsonMetadata<'a> {
    mode: &'a str,
    model: &'a str,
    dialect: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    word_count: WordCounts,
}

#[derive(Debug, Serialize)]
struct WordCounts {
    original: usize,
    polished: usize,
}

impl<'a> From<&ExportDocument<'a>> for JsonExport<'a> {
    fn from(document: &ExportDocument<'a>) -> Self {
        let metadata = document.metadata;
        Self {
            original: document.original,
            polished: document.polished,
            metadata: JsonMetadata {
                mode: document.mode,
                model: document.model,
                dialect: document.dialect,
                timestamp: document.timestamp.to_rfc3339(),
                title: metadata.title.as_deref(),
                author: metadata.author.as_deref(),
                subject: metadata.subject.as_deref(),
                word_count: WordCounts {
                    original: word_count(document.original),
                    polished: word_count(document.polished),
                },
            },
        }
    }
}

/// Writes a pretty-printed JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn write(&self, writer: &mut dyn Write, document: &ExportDocument<'_>) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut *writer, &JsonExport::from(document)).map_err(|error| {
            ExportError::Storage(crate::storage::StorageError::Serialisation {
                what: "export",
                message: error.to_string(),
            })
        })?;
        writeln!(writer).map_err(|error| ExportError::io(&error))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::JsonExporter;
    use crate::export::ExportMetadata;
    use crate::export::test_support::{document, render_to_string};

    #[test]
    fn includes_both_versions_and_metadata() -> Result<(), Box<dyn std::error::Error>> {
        let metadata = ExportMetadata {
            subject: Some("Ecology".to_owned()),
            ..ExportMetadata::default()
        };

        let rendered = render_to_string(
            &JsonExporter,
            &document("the draft text", "The polished text.", &metadata),
        )?;
        let value: Value = serde_json::from_str(&rendered)?;

        assert_eq!(value["original"], "the draft text");
        assert_eq!(value["polished"], "The polished text.");
        assert_eq!(value["metadata"]["mode"], "standard");
        assert_eq!(value["metadata"]["subject"], "Ecology");
        assert_eq!(value["metadata"]["word_count"]["original"], 3);
        assert_eq!(value["metadata"]["word_count"]["polished"], 3);
        assert!(value["metadata"].get("title").is_none());
        Ok(())
    }
}
