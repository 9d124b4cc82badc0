//! PDF exporter.
//!
//! Pages are letter sized with one-inch margins. The body is set in one of
//! the standard PDF fonts, so no font files are embedded; wrapping uses an
//! average glyph width per family.

use std::io::Write;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

use super::Exporter;
use super::error::ExportError;
use super::layout::{body_lines, wrap};
use super::model::{ExportDocument, ExportFormat, FontFamily};

const PAGE_WIDTH: u16 = 612;
const PAGE_HEIGHT: u16 = 792;
const MARGIN: u16 = 72;
const BODY_SIZE: u16 = 12;
const TITLE_SIZE: u16 = 18;
const FOOTER_SIZE: u16 = 10;
const FOOTER_BASELINE: u16 = 50;
const SINGLE_PITCH: u16 = 14;
const DOUBLE_PITCH: u16 = 28;
const NUMBER_RIGHT_EDGE: u16 = 60;
const LAYER_NAME: &str = "Body";
const DEFAULT_TITLE: &str = "Polished Academic Text";

/// Typeface a placed run is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Body,
    Heading,
    Label,
    Number,
}

/// Text placed at a baseline, in points from the bottom-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placed {
    text: String,
    face: Face,
    size: u16,
    x: u16,
    baseline: u16,
}

#[derive(Debug, Default)]
struct PageLayout {
    items: Vec<Placed>,
}

/// Top-down cursor filling pages with lines.
#[derive(Debug)]
struct Cursor {
    pages: Vec<PageLayout>,
    from_top: u16,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            from_top: MARGIN,
        }
    }

    /// Reserves a line of `size` points, starting a page when the bottom
    /// margin would be crossed, and returns its baseline.
    fn line(&mut self, size: u16, pitch: u16) -> u16 {
        let mut baseline_from_top = self.from_top.saturating_add(size);
        if baseline_from_top > PAGE_HEIGHT.saturating_sub(MARGIN) {
            self.pages.push(PageLayout::default());
            self.from_top = MARGIN;
            baseline_from_top = MARGIN.saturating_add(size);
        }
        self.from_top = self.from_top.saturating_add(pitch);
        PAGE_HEIGHT.saturating_sub(baseline_from_top)
    }

    const fn skip(&mut self, points: u16) {
        self.from_top = self.from_top.saturating_add(points);
    }

    fn place(&mut self, item: Placed) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }
}

const fn glyph_width(family: FontFamily) -> u16 {
    match family {
        FontFamily::Serif => 5,
        FontFamily::SansSerif => 6,
        FontFamily::Monospace => 7,
    }
}

const fn body_font(family: FontFamily) -> BuiltinFont {
    match family {
        FontFamily::Serif => BuiltinFont::TimesRoman,
        FontFamily::SansSerif => BuiltinFont::Helvetica,
        FontFamily::Monospace => BuiltinFont::Courier,
    }
}

fn approximate_width(text: &str, size: u16) -> u16 {
    let chars = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    chars.saturating_mul(size).checked_div(2).unwrap_or_default()
}

fn centred_x(text: &str, size: u16) -> u16 {
    PAGE_WIDTH
        .saturating_sub(approximate_width(text, size))
        .checked_div(2)
        .unwrap_or_default()
}

fn place_title(cursor: &mut Cursor, document: &ExportDocument<'_>) {
    let metadata = document.metadata;
    let Some(title) = metadata.title.as_deref() else {
        return;
    };
    let baseline = cursor.line(TITLE_SIZE, TITLE_SIZE.saturating_add(8));
    cursor.place(Placed {
        text: title.to_owned(),
        face: Face::Heading,
        size: TITLE_SIZE,
        x: centred_x(title, TITLE_SIZE),
        baseline,
    });
    for byline in [metadata.author.as_deref(), metadata.subject.as_deref()]
        .into_iter()
        .flatten()
    {
        let baseline = cursor.line(BODY_SIZE, SINGLE_PITCH);
        cursor.place(Placed {
            text: byline.to_owned(),
            face: Face::Label,
            size: BODY_SIZE,
            x: centred_x(byline, BODY_SIZE),
            baseline,
        });
    }
    cursor.skip(SINGLE_PITCH.saturating_mul(2));
}

/// Lays the document out into pages, footers included.
fn paginate(document: &ExportDocument<'_>) -> Vec<PageLayout> {
    let formatting = &document.metadata.formatting;
    let family = formatting.font_family();
    let pitch = if formatting.double_spaced {
        DOUBLE_PITCH
    } else {
        SINGLE_PITCH
    };
    let width = usize::from(
        PAGE_WIDTH
            .saturating_sub(MARGIN.saturating_mul(2))
            .checked_div(glyph_width(family))
            .unwrap_or(1),
    );

    let mut cursor = Cursor::new();
    place_title(&mut cursor, document);

    let lines = body_lines(document.polished);
    let mut remaining = lines.iter().peekable();
    while let Some(line) = remaining.next() {
        for (row, text) in wrap(line.text, width).into_iter().enumerate() {
            let baseline = cursor.line(BODY_SIZE, pitch);
            if formatting.line_numbers && row == 0 {
                let number = line.number.to_string();
                cursor.place(Placed {
                    x: NUMBER_RIGHT_EDGE.saturating_sub(approximate_width(&number, BODY_SIZE)),
                    text: number,
                    face: Face::Number,
                    size: BODY_SIZE,
                    baseline,
                });
            }
            cursor.place(Placed {
                text,
                face: Face::Body,
                size: BODY_SIZE,
                x: MARGIN,
                baseline,
            });
        }
        if line.ends_paragraph && remaining.peek().is_some() {
            cursor.skip(pitch);
        }
    }

    let mut pages = cursor.pages;
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        let footer = format!("Page {} of {total}", index.saturating_add(1));
        page.items.push(Placed {
            x: centred_x(&footer, FOOTER_SIZE),
            text: footer,
            face: Face::Label,
            size: FOOTER_SIZE,
            baseline: FOOTER_BASELINE,
        });
    }
    pages
}

#[expect(
    clippy::float_arithmetic,
    reason = "point to millimetre conversion for the PDF backend"
)]
fn mm(points: u16) -> Mm {
    Mm(f32::from(points) * 25.4 / 72.0)
}

fn typesetting(error: &impl std::fmt::Display) -> ExportError {
    ExportError::Typesetting {
        format: ExportFormat::Pdf,
        message: error.to_string(),
    }
}

fn render(pages: &[PageLayout], document: &ExportDocument<'_>) -> Result<Vec<u8>, ExportError> {
    let title = document
        .metadata
        .title
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.to_owned());
    let (pdf, first_page, first_layer) = PdfDocument::new(
        title,
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        LAYER_NAME.to_owned(),
    );
    let family = document.metadata.formatting.font_family();
    let body = pdf
        .add_builtin_font(body_font(family))
        .map_err(|error| typesetting(&error))?;
    let heading = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|error| typesetting(&error))?;
    let label = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|error| typesetting(&error))?;
    let mut targets = vec![(first_page, first_layer)];
    for _ in pages.iter().skip(1) {
        targets.push(pdf.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME.to_owned()));
    }
    for (page, (page_index, layer_index)) in pages.iter().zip(targets) {
        let layer = pdf.get_page(page_index).get_layer(layer_index);
        for item in &page.items {
            let font: &IndirectFontRef = match item.face {
                Face::Body => &body,
                Face::Heading => &heading,
                Face::Label | Face::Number => &label,
            };
            layer.use_text(
                item.text.as_str(),
                f32::from(item.size),
                mm(item.x),
                mm(item.baseline),
                font,
            );
        }
    }

    pdf.save_to_bytes().map_err(|error| typesetting(&error))
}

/// Writes a paginated PDF honouring the formatting options.
///
/// The title, author, and subject head the first page; every page carries
/// a "Page n of m" footer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter;

impl Exporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn write(&self, writer: &mut dyn Write, document: &ExportDocument<'_>) -> Result<(), ExportError> {
        let pages = paginate(document);
        let bytes = render(&pages, document)?;
        writer
            .write_all(&bytes)
            .map_err(|error| ExportError::io(&error))
    }
}
