//! PDF report renderer.
//!
//! Lays the report out on A4 pages with the standard Helvetica fonts:
//! a bold centred title, `Name:` and `Timestamp:` lines, then a grid table
//! whose light-blue header row repeats on every page. Highlighted cells are
//! filled black with white text.
//!
//! Text is drawn in Helvetica under WinAnsiEncoding. Hangul and CJK
//! characters switch to the non-embedded `HYSMyeongJo-Medium` CID font, which
//! viewers substitute with a local Korean font. Latin Extended-A letters are
//! drawn as their base letters, and anything else is replaced with `?`. Only
//! control characters fail the render.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use phonoquiz_core::error::RenderError;
use phonoquiz_core::report::ReportDocument;
use phonoquiz_core::traits::{ReportFormat, ReportRenderer};

const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const WIDE: &str = "F3";

const WIDE_FONT: &str = "HYSMyeongJo-Medium";

const HEADER_FILL: (f32, f32, f32) = (0.678, 0.847, 0.902);
const GRID: (f32, f32, f32) = (0.502, 0.502, 0.502);
const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const WHITE: (f32, f32, f32) = (1.0, 1.0, 1.0);

/// Page geometry and type sizes, in points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub title_size: f32,
    pub body_size: f32,
    pub leading: f32,
    pub spacer: f32,
    pub cell_padding_x: f32,
    pub cell_padding_y: f32,
    pub grid_width: f32,
}

impl Default for PageLayout {
    /// A4 portrait with one-inch margins.
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin: 72.0,
            title_size: 18.0,
            body_size: 10.0,
            leading: 12.0,
            spacer: 12.0,
            cell_padding_x: 6.0,
            cell_padding_y: 3.0,
            grid_width: 0.5,
        }
    }
}

/// Renders reports as PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    layout: PageLayout,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: PageLayout) -> Self {
        Self { layout }
    }
}

impl ReportRenderer for PdfRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        document.validate()?;
        let text = EncodedText::new(document)?;
        let pages = self.layout_pages(&text);
        let page_count = pages.len();
        let bytes = assemble(&self.layout, document, pages, text.uses_wide_font())?;
        tracing::debug!(
            rows = document.rows.len(),
            pages = page_count,
            bytes = bytes.len(),
            "rendered pdf report"
        );
        Ok(bytes)
    }
}

/// One character as drawn: a WinAnsi byte in Helvetica, or a UCS-2 code
/// in the CID font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Latin(u8),
    Wide(u16),
}

const SPACE: Glyph = Glyph::Latin(b' ');

/// Every string of the report, already mapped to glyphs.
struct EncodedText {
    title: Vec<Glyph>,
    name_line: Vec<Glyph>,
    timestamp_line: Vec<Glyph>,
    header: Vec<Vec<Glyph>>,
    rows: Vec<Vec<(Vec<Glyph>, bool)>>,
}

impl EncodedText {
    fn new(document: &ReportDocument) -> Result<Self, RenderError> {
        let header = document
            .header
            .iter()
            .enumerate()
            .map(|(c, h)| encode_text(h, || format!("header column {}", c + 1)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(document.rows.len());
        for (r, row) in document.rows.iter().enumerate() {
            let cells = row
                .cells
                .iter()
                .zip(&document.header)
                .map(|(cell, column)| {
                    encode_text(&cell.text, || format!("row {}, column '{}'", r + 1, column))
                        .map(|glyphs| (glyphs, cell.highlight))
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }

        Ok(Self {
            title: encode_text(&document.title, || "title".into())?,
            name_line: encode_text(&format!("Name: {}", document.student), || {
                "student name".into()
            })?,
            timestamp_line: encode_text(
                &format!("Timestamp: {}", document.timestamp_line()),
                || "timestamp".into(),
            )?,
            header,
            rows,
        })
    }

    fn uses_wide_font(&self) -> bool {
        let wide = |text: &[Glyph]| text.iter().any(|g| matches!(g, Glyph::Wide(_)));
        wide(&self.title)
            || wide(&self.name_line)
            || wide(&self.timestamp_line)
            || self.header.iter().any(|h| wide(h))
            || self.rows.iter().flatten().any(|(cell, _)| wide(cell))
    }
}

#[derive(Clone, Copy, PartialEq)]
enum RowStyle {
    Header,
    Body,
}

impl PdfRenderer {
    /// Content operations for each page.
    fn layout_pages(&self, text: &EncodedText) -> Vec<Vec<Operation>> {
        let l = &self.layout;
        let available = l.width - 2.0 * l.margin;
        let widths = column_widths(l, text, available);
        let table_width: f32 = widths.iter().sum();
        let x0 = l.margin + (available - table_width) / 2.0;
        let bottom = l.margin;

        let wrap_row = |cells: &[Vec<Glyph>], bold: bool| -> Vec<Vec<Vec<Glyph>>> {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| wrap(cell, w - 2.0 * l.cell_padding_x, bold, l.body_size))
                .collect()
        };
        let row_height = |lines: &[Vec<Vec<Glyph>>]| -> f32 {
            let n = lines.iter().map(Vec::len).max().unwrap_or(1).max(1);
            n as f32 * l.leading + 2.0 * l.cell_padding_y
        };

        let header_lines = wrap_row(&text.header, true);
        let header_height = row_height(&header_lines);
        let no_highlights = vec![false; text.header.len()];

        let mut pages = Vec::new();
        let mut ops = Vec::new();

        // Title block.
        let mut y = l.height - l.margin - l.title_size;
        let title_w = text_width(&text.title, true, l.title_size);
        let title_x = l.margin + ((available - title_w) / 2.0).max(0.0);
        push_text(&mut ops, true, l.title_size, BLACK, title_x, y, &text.title);
        y -= l.spacer + l.leading;
        push_text(&mut ops, false, l.body_size, BLACK, l.margin, y, &text.name_line);
        y -= l.leading;
        push_text(&mut ops, false, l.body_size, BLACK, l.margin, y, &text.timestamp_line);
        y -= l.spacer;

        draw_row(
            &mut ops,
            l,
            x0,
            y,
            &widths,
            &header_lines,
            &no_highlights,
            header_height,
            RowStyle::Header,
        );
        y -= header_height;
        let mut rows_on_page = 0;

        for row in &text.rows {
            let cells: Vec<Vec<Glyph>> = row.iter().map(|(glyphs, _)| glyphs.clone()).collect();
            let highlights: Vec<bool> = row.iter().map(|(_, h)| *h).collect();
            let lines = wrap_row(&cells, false);
            let height = row_height(&lines);

            // A row taller than a whole page is drawn anyway rather than
            // paginating forever.
            if y - height < bottom && rows_on_page > 0 {
                pages.push(std::mem::take(&mut ops));
                y = l.height - l.margin;
                draw_row(
                    &mut ops,
                    l,
                    x0,
                    y,
                    &widths,
                    &header_lines,
                    &no_highlights,
                    header_height,
                    RowStyle::Header,
                );
                y -= header_height;
                rows_on_page = 0;
            }

            draw_row(
                &mut ops,
                l,
                x0,
                y,
                &widths,
                &lines,
                &highlights,
                height,
                RowStyle::Body,
            );
            y -= height;
            rows_on_page += 1;
        }
        pages.push(ops);
        pages
    }
}

/// Natural column widths, scaled down proportionally when the table would
/// exceed the printable width.
fn column_widths(l: &PageLayout, text: &EncodedText, available: f32) -> Vec<f32> {
    let mut widths: Vec<f32> = text
        .header
        .iter()
        .map(|h| text_width(h, true, l.body_size))
        .collect();
    for row in &text.rows {
        for ((cell, _), w) in row.iter().zip(widths.iter_mut()) {
            *w = w.max(text_width(cell, false, l.body_size));
        }
    }
    for w in &mut widths {
        *w += 2.0 * l.cell_padding_x;
    }

    let total: f32 = widths.iter().sum();
    if total > available {
        let scale = available / total;
        for w in &mut widths {
            *w *= scale;
        }
    }
    widths
}

#[allow(clippy::too_many_arguments)]
fn draw_row(
    ops: &mut Vec<Operation>,
    l: &PageLayout,
    x0: f32,
    y_top: f32,
    widths: &[f32],
    lines: &[Vec<Vec<Glyph>>],
    highlights: &[bool],
    height: f32,
    style: RowStyle,
) {
    let bold = style == RowStyle::Header;
    let y_bottom = y_top - height;
    let mut x = x0;

    for ((w, cell_lines), highlight) in widths.iter().zip(lines).zip(highlights) {
        let fill = match (style, *highlight) {
            (RowStyle::Header, _) => Some(HEADER_FILL),
            (RowStyle::Body, true) => Some(BLACK),
            (RowStyle::Body, false) => None,
        };
        if let Some(colour) = fill {
            ops.push(colour_op("rg", colour));
            ops.push(rect(x, y_bottom, *w, height));
            ops.push(Operation::new("f", vec![]));
        }

        ops.push(colour_op("RG", GRID));
        ops.push(Operation::new("w", vec![Object::Real(l.grid_width)]));
        ops.push(rect(x, y_bottom, *w, height));
        ops.push(Operation::new("S", vec![]));

        let text_colour = if fill == Some(BLACK) { WHITE } else { BLACK };
        for (i, line) in cell_lines.iter().enumerate() {
            let line_w = text_width(line, bold, l.body_size);
            let tx = x + ((w - line_w) / 2.0).max(l.cell_padding_x.min(w / 2.0));
            let ty = y_top - l.cell_padding_y - (i as f32 + 1.0) * l.leading
                + (l.leading - l.body_size);
            push_text(ops, bold, l.body_size, text_colour, tx, ty, line);
        }
        x += w;
    }
}

/// One text object; the font switches at every Latin/wide boundary.
fn push_text(
    ops: &mut Vec<Operation>,
    bold: bool,
    size: f32,
    colour: (f32, f32, f32),
    x: f32,
    y: f32,
    text: &[Glyph],
) {
    ops.push(colour_op("rg", colour));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
    for run in runs(text) {
        let (font, string) = match run[0] {
            Glyph::Latin(_) => {
                let bytes = run
                    .iter()
                    .filter_map(|g| match g {
                        Glyph::Latin(b) => Some(*b),
                        Glyph::Wide(_) => None,
                    })
                    .collect();
                let font = if bold { BOLD } else { REGULAR };
                (font, Object::String(bytes, StringFormat::Literal))
            }
            Glyph::Wide(_) => {
                let bytes = run
                    .iter()
                    .flat_map(|g| match g {
                        Glyph::Wide(code) => code.to_be_bytes(),
                        Glyph::Latin(b) => [0, *b],
                    })
                    .collect();
                (WIDE, Object::String(bytes, StringFormat::Hexadecimal))
            }
        };
        ops.push(Operation::new("Tf", vec![font.into(), Object::Real(size)]));
        ops.push(Operation::new("Tj", vec![string]));
    }
    ops.push(Operation::new("ET", vec![]));
}

/// Maximal slices of `text` drawn with the same font.
fn runs(text: &[Glyph]) -> impl Iterator<Item = &[Glyph]> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        let wide = matches!(rest.first()?, Glyph::Wide(_));
        let len = rest
            .iter()
            .position(|g| matches!(g, Glyph::Wide(_)) != wide)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(len);
        rest = tail;
        Some(run)
    })
}

fn colour_op(op: &str, (r, g, b): (f32, f32, f32)) -> Operation {
    Operation::new(op, vec![Object::Real(r), Object::Real(g), Object::Real(b)])
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Operation {
    Operation::new(
        "re",
        vec![Object::Real(x), Object::Real(y), Object::Real(w), Object::Real(h)],
    )
}

/// Build the PDF object graph and serialize it.
fn assemble(
    l: &PageLayout,
    document: &ReportDocument,
    pages: Vec<Vec<Operation>>,
    wide: bool,
) -> Result<Vec<u8>, RenderError> {
    let serialize = |e: lopdf::Error| RenderError::Serialize(e.to_string());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |base: &str| {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base.to_string(),
            "Encoding" => "WinAnsiEncoding",
        }
    };
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let mut fonts = dictionary! {
        REGULAR => regular_id,
        BOLD => bold_id,
    };
    if wide {
        fonts.set(WIDE, add_wide_font(&mut doc));
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(serialize)?,
        ));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(l.width),
                Object::Real(l.height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(&document.title),
        "Author" => text_string(&document.student),
        "Producer" => text_string(concat!("phonoquiz ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(
            document.generated_at.format("D:%Y%m%d%H%M%S").to_string(),
        ),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| RenderError::Serialize(e.to_string()))?;
    Ok(bytes)
}

/// The Korean CID font with its descendant and descriptor. Nothing is
/// embedded; metrics follow the Adobe-Korea1 collection.
fn add_wide_font(doc: &mut Document) -> ObjectId {
    let int = Object::Integer;
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => WIDE_FONT,
        "Flags" => int(6),
        "FontBBox" => vec![int(0), int(-148), int(1001), int(880)],
        "ItalicAngle" => int(0),
        "Ascent" => int(880),
        "Descent" => int(-120),
        "CapHeight" => int(880),
        "StemV" => int(59),
    });
    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => WIDE_FONT,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Korea1"),
            "Supplement" => int(1),
        },
        "FontDescriptor" => descriptor_id,
        "DW" => int(i64::from(WIDE_WIDTH)),
    });
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => WIDE_FONT,
        "Encoding" => "UniKS-UCS2-H",
        "DescendantFonts" => vec![Object::Reference(descendant_id)],
    })
}

/// A PDF text string in UTF-16BE, for the document information dictionary.
fn text_string(s: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Map `text` to glyphs. Whitespace becomes a space and combining marks
/// are dropped. Characters no font here can draw become `?` with a warning;
/// only control characters are an error.
fn encode_text(text: &str, location: impl Fn() -> String) -> Result<Vec<Glyph>, RenderError> {
    let mut glyphs = Vec::with_capacity(text.len());
    let mut replaced = 0usize;
    for ch in text.chars() {
        let ch = if ch.is_whitespace() { ' ' } else { ch };
        if ch.is_control() {
            return Err(RenderError::Unencodable {
                location: location(),
                ch,
            });
        }
        if let Some(b) = win_ansi_byte(ch) {
            glyphs.push(Glyph::Latin(b));
        } else if let Some(code) = wide_code(ch) {
            glyphs.push(Glyph::Wide(code));
        } else if let Some(base) = base_letters(ch) {
            glyphs.extend(base.bytes().map(Glyph::Latin));
        } else {
            glyphs.push(Glyph::Latin(b'?'));
            replaced += 1;
        }
    }
    if replaced > 0 {
        tracing::warn!(
            location = %location(),
            replaced,
            "characters the report fonts cannot draw were replaced with '?'"
        );
    }
    Ok(glyphs)
}

/// Hangul and CJK code points drawn with the CID font.
fn wide_code(ch: char) -> Option<u16> {
    let code = u32::from(ch);
    match code {
        0x3000..=0x303F | 0x3130..=0x318F | 0x4E00..=0x9FFF | 0xAC00..=0xD7A3 | 0xFF01..=0xFF60 => {
            u16::try_from(code).ok()
        }
        _ => None,
    }
}

/// Latin Extended-A (U+0100..=U+017F) without diacritics.
const LATIN_EXTENDED_A: [&str; 128] = [
    "A", "a", "A", "a", "A", "a", "C", "c", "C", "c", "C", "c", "C", "c", "D", "d", // 0x100
    "D", "d", "E", "e", "E", "e", "E", "e", "E", "e", "E", "e", "G", "g", "G", "g", // 0x110
    "G", "g", "G", "g", "H", "h", "H", "h", "I", "i", "I", "i", "I", "i", "I", "i", // 0x120
    "I", "i", "IJ", "ij", "J", "j", "K", "k", "k", "L", "l", "L", "l", "L", "l", "L", // 0x130
    "l", "L", "l", "N", "n", "N", "n", "N", "n", "n", "N", "n", "O", "o", "O", "o", // 0x140
    "O", "o", "OE", "oe", "R", "r", "R", "r", "R", "r", "S", "s", "S", "s", "S", "s", // 0x150
    "S", "s", "T", "t", "T", "t", "T", "t", "U", "u", "U", "u", "U", "u", "U", "u", // 0x160
    "U", "u", "U", "u", "W", "w", "Y", "y", "Y", "Z", "z", "Z", "z", "Z", "z", "s", // 0x170
];

/// ASCII stand-ins for accented letters, and nothing for combining marks
/// and zero-width characters.
fn base_letters(ch: char) -> Option<&'static str> {
    match u32::from(ch) {
        code @ 0x100..=0x17F => usize::try_from(code - 0x100)
            .ok()
            .and_then(|i| LATIN_EXTENDED_A.get(i).copied()),
        0x300..=0x36F | 0x200B..=0x200D | 0xFEFF => Some(""),
        _ => None,
    }
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => u8::try_from(code).ok(),
        _ => Some(match ch {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => return None,
        }),
    }
}

/// Helvetica advance widths for 0x20..=0x7E, in thousandths of an em.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 0x70
];

/// Width used for bytes outside the ASCII table.
const DEFAULT_WIDTH: u16 = 556;

/// Every CID font glyph is one em wide.
const WIDE_WIDTH: u16 = 1000;

fn text_width(text: &[Glyph], bold: bool, size: f32) -> f32 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let units: u32 = text
        .iter()
        .map(|g| match *g {
            Glyph::Latin(b @ 0x20..=0x7E) => u32::from(table[usize::from(b - 0x20)]),
            Glyph::Latin(_) => u32::from(DEFAULT_WIDTH),
            Glyph::Wide(_) => u32::from(WIDE_WIDTH),
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap to `max_width`; words wider than a line are split.
fn wrap(text: &[Glyph], max_width: f32, bold: bool, size: f32) -> Vec<Vec<Glyph>> {
    let mut lines: Vec<Vec<Glyph>> = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();

    for word in text.split(|&g| g == SPACE).filter(|w| !w.is_empty()) {
        let mut candidate = current.clone();
        if !candidate.is_empty() {
            candidate.push(SPACE);
        }
        candidate.extend_from_slice(word);
        if text_width(&candidate, bold, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for &g in word {
            current.push(g);
            if current.len() > 1 && text_width(&current, bold, size) > max_width {
                current.pop();
                lines.push(std::mem::replace(&mut current, vec![g]));
            }
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
