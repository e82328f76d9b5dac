//! Filled-form PDF output: plain text laid out on US Letter pages.
//!
//! Rendering is two steps. [`layout_text`] is pure: it decides which string
//! goes where and when a page breaks. [`render_pdf`] turns that layout into a
//! PDF with lopdf using the built-in Helvetica faces, so no font files are
//! embedded.
//!
//! Wrapping is a plain character-count cut at [`WRAP_COLUMN`]; it does not
//! look for word boundaries.

use crate::error::AutofillError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::Cursor;
use tracing::{debug, info};

/// US Letter width in points.
pub const PAGE_WIDTH: i64 = 612;
/// US Letter height in points.
pub const PAGE_HEIGHT: i64 = 792;
/// Left edge of every drawn line.
pub const LEFT_MARGIN: i64 = 40;
/// Baseline of the first line on a page.
pub const TOP_Y: i64 = PAGE_HEIGHT - 40;
/// A new page starts once the cursor drops below this.
pub const BOTTOM_MARGIN: i64 = 40;
/// Vertical advance per body line.
pub const LINE_HEIGHT: i64 = 12;
/// Gap below the title before the first body line.
pub const TITLE_GAP: i64 = 30;
/// Body lines longer than this many characters are cut.
pub const WRAP_COLUMN: usize = 110;
/// Heading drawn at the top of the first page.
pub const TITLE: &str = "Final Clean Form (AI-filled)";

const TITLE_SIZE: i64 = 14;
const BODY_SIZE: i64 = 10;

/// One of the two standard faces used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

/// A single string placed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnLine {
    pub x: i64,
    pub y: i64,
    pub face: Face,
    pub size: i64,
    pub text: String,
}

/// Everything drawn on one page, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLayout {
    pub lines: Vec<DrawnLine>,
}

impl PageLayout {
    /// Body lines only (the title is excluded).
    pub fn body_lines(&self) -> impl Iterator<Item = &DrawnLine> {
        self.lines.iter().filter(|l| l.face == Face::Regular)
    }
}

/// Tracks the vertical position and opens pages lazily, so trailing blank
/// lines never produce an empty page.
struct Pen {
    pages: Vec<PageLayout>,
    y: i64,
    pending_page: bool,
}

impl Pen {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            y: TOP_Y,
            pending_page: false,
        }
    }

    fn place(&mut self, text: &str, face: Face, size: i64) {
        if self.pending_page {
            self.pages.push(PageLayout::default());
            self.pending_page = false;
        }
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(DrawnLine {
                x: LEFT_MARGIN,
                y: self.y,
                face,
                size,
                text: text.to_string(),
            });
        }
    }

    fn title(&mut self) {
        self.place(TITLE, Face::Bold, TITLE_SIZE);
        self.y -= TITLE_GAP;
    }

    fn line(&mut self, text: &str) {
        self.place(text, Face::Regular, BODY_SIZE);
        self.advance();
    }

    /// The bottom check lives here so wrapped segments and blank lines can
    /// break a page too; checking only after a whole source line would draw
    /// the tail of a long line below the margin.
    fn advance(&mut self) {
        self.y -= LINE_HEIGHT;
        if self.y < BOTTOM_MARGIN {
            self.y = TOP_Y;
            self.pending_page = true;
        }
    }
}

/// Lay out `text` under the title, one page per [`PageLayout`].
///
/// Whitespace-only lines take up vertical space without drawing. Longer lines
/// are cut every [`WRAP_COLUMN`] characters; the last piece is trimmed.
pub fn layout_text(text: &str) -> Vec<PageLayout> {
    let mut pen = Pen::new();
    pen.title();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            pen.advance();
            continue;
        }

        let mut rest = line;
        while let Some((cut, _)) = rest.char_indices().nth(WRAP_COLUMN) {
            pen.line(&rest[..cut]);
            rest = &rest[cut..];
        }
        pen.line(rest.trim());
    }

    pen.pages
}

/// Render `text` to an in-memory PDF positioned at its first byte.
pub fn render_pdf(text: &str) -> Result<Cursor<Vec<u8>>, AutofillError> {
    let pages = layout_text(text);
    let bytes = write_pdf(&pages)?;
    info!("Rendered PDF: {} pages, {} bytes", pages.len(), bytes.len());
    Ok(Cursor::new(bytes))
}

fn font(base: &str) -> Dictionary {
    Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(base.as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

/// WinAnsi assigns printable glyphs to 0x80..=0x9F where Latin-1 has C1
/// controls.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80), // €
    ('\u{201A}', 0x82), // ‚
    ('\u{0192}', 0x83), // ƒ
    ('\u{201E}', 0x84), // „
    ('\u{2026}', 0x85), // …
    ('\u{2020}', 0x86), // †
    ('\u{2021}', 0x87), // ‡
    ('\u{02C6}', 0x88), // ˆ
    ('\u{2030}', 0x89), // ‰
    ('\u{0160}', 0x8A), // Š
    ('\u{2039}', 0x8B), // ‹
    ('\u{0152}', 0x8C), // Œ
    ('\u{017D}', 0x8E), // Ž
    ('\u{2018}', 0x91), // ‘
    ('\u{2019}', 0x92), // ’
    ('\u{201C}', 0x93), // “
    ('\u{201D}', 0x94), // ”
    ('\u{2022}', 0x95), // •
    ('\u{2013}', 0x96), // –
    ('\u{2014}', 0x97), // —
    ('\u{02DC}', 0x98), // ˜
    ('\u{2122}', 0x99), // ™
    ('\u{0161}', 0x9A), // š
    ('\u{203A}', 0x9B), // ›
    ('\u{0153}', 0x9C), // œ
    ('\u{017E}', 0x9E), // ž
    ('\u{0178}', 0x9F), // Ÿ
];

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        0x80..=0x9F => b'?',
        code @ 0..=0xFF => code as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map_or(b'?', |&(_, byte)| byte),
    }
}

/// Encode for the standard fonts' `WinAnsiEncoding`; characters it has no
/// glyph for are drawn as `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn page_operations(page: &PageLayout) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(page.lines.len() * 5);
    for line in &page.lines {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(line.face.resource_name().as_bytes().to_vec()),
                Object::Integer(line.size),
            ],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Integer(line.x), Object::Integer(line.y)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&line.text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

fn write_pdf(pages: &[PageLayout]) -> Result<Vec<u8>, AutofillError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([
            (Face::Regular.resource_name(), Object::Reference(regular_id)),
            (Face::Bold.resource_name(), Object::Reference(bold_id)),
        ])),
    )]));

    let mut kids = Vec::with_capacity(pages.len());
    for (idx, page) in pages.iter().enumerate() {
        let content = Content {
            operations: page_operations(page),
        };
        let encoded = content
            .encode()
            .map_err(|e| AutofillError::PdfRender(format!("page {}: {}", idx + 1, e)))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH),
                    Object::Integer(PAGE_HEIGHT),
                ]),
            ),
        ]));
        debug!("Page {}: {} lines", idx + 1, page.lines.len());
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ])),
    );

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.compress();

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| AutofillError::PdfRender(format!("save failed: {e}")))?;
    Ok(output)
}
