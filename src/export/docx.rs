//! DOCX exporter.

use std::io::{Cursor, Write};

use docx_rs::{AlignmentType, Docx, LineSpacing, Paragraph, Run, RunFonts};

use super::Exporter;
use super::error::ExportError;
use super::layout::body_lines;
use super::model::{ExportDocument, ExportFormat};

/// Line spacing in 240ths of a line.
const SINGLE_SPACING: i32 = 276;
const DOUBLE_SPACING: i32 = 480;
/// Space after a paragraph, in twentieths of a point.
const PARAGRAPH_AFTER: u32 = 200;
const TITLE_AFTER: u32 = 400;
/// Font sizes in half points.
const BODY_SIZE: usize = 24;
const TITLE_SIZE: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Title,
    Byline,
    Body,
}

/// One paragraph of the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    role: Role,
    number: Option<usize>,
    text: String,
}

/// Orders the document's paragraphs.
///
/// With line numbering every source line becomes its own numbered
/// paragraph; otherwise the lines of a paragraph are joined by spaces.
fn blocks(document: &ExportDocument<'_>) -> Vec<Block> {
    let metadata = document.metadata;
    let mut blocks = Vec::new();
    if let Some(title) = metadata.title.as_deref() {
        blocks.push(Block {
            role: Role::Title,
            number: None,
            text: title.to_owned(),
        });
        for byline in [metadata.author.as_deref(), metadata.subject.as_deref()]
            .into_iter()
            .flatten()
        {
            blocks.push(Block {
                role: Role::Byline,
                number: None,
                text: byline.to_owned(),
            });
        }
    }

    let numbered = metadata.formatting.line_numbers;
    let mut pending: Vec<&str> = Vec::new();
    for line in body_lines(document.polished) {
        if numbered {
            blocks.push(Block {
                role: Role::Body,
                number: Some(line.number),
                text: line.text.to_owned(),
            });
            continue;
        }
        pending.push(line.text);
        if line.ends_paragraph {
            blocks.push(Block {
                role: Role::Body,
                number: None,
                text: pending.join(" "),
            });
            pending.clear();
        }
    }
    blocks
}

fn paragraph(block: &Block, fonts: &RunFonts, line: i32) -> Paragraph {
    match block.role {
        Role::Title => Paragraph::new()
            .add_run(
                Run::new()
                    .add_text(block.text.as_str())
                    .bold()
                    .size(TITLE_SIZE)
                    .fonts(fonts.clone()),
            )
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(TITLE_AFTER)),
        Role::Byline => Paragraph::new()
            .add_run(
                Run::new()
                    .add_text(block.text.as_str())
                    .size(BODY_SIZE)
                    .fonts(fonts.clone()),
            )
            .align(AlignmentType::Center),
        Role::Body => {
            let mut paragraph = Paragraph::new();
            if let Some(number) = block.number {
                paragraph = paragraph.add_run(
                    Run::new()
                        .add_text(format!("{number}  "))
                        .size(BODY_SIZE)
                        .fonts(fonts.clone()),
                );
            }
            paragraph
                .add_run(
                    Run::new()
                        .add_text(block.text.as_str())
                        .size(BODY_SIZE)
                        .fonts(fonts.clone()),
                )
                .align(AlignmentType::Both)
                .line_spacing(LineSpacing::new().line(line).after(PARAGRAPH_AFTER))
        }
    }
}

/// Writes a word-processing document in the requested font.
///
/// Double spacing sets the body line height to two lines; line numbering
/// prefixes each source line with its number.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExporter;

impl Exporter for DocxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn write(&self, writer: &mut dyn Write, document: &ExportDocument<'_>) -> Result<(), ExportError> {
        let formatting = &document.metadata.formatting;
        let font = formatting.font_family().document_name();
        let fonts = RunFonts::new().ascii(font).hi_ansi(font).cs(font);
        let line = if formatting.double_spaced {
            DOUBLE_SPACING
        } else {
            SINGLE_SPACING
        };

        let docx = blocks(document)
            .iter()
            .fold(Docx::new(), |docx, block| {
                docx.add_paragraph(paragraph(block, &fonts, line))
            });
        let mut packed = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut packed)
            .map_err(|error| ExportError::Typesetting {
                format: ExportFormat::Docx,
                message: error.to_string(),
            })?;
        writer
            .write_all(packed.get_ref())
            .map_err(|error| ExportError::io(&error))
    }
}
