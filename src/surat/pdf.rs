//! PDF emission for laid-out pages using lopdf.
//!
//! The output uses the standard Helvetica fonts, uncompressed content streams
//! and no creation/modification dates, so the same pages always serialize to
//! the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

use super::layout::{Page, PageGeometry, TextStyle};

/// Upper bound on lines per page.
pub const DEFAULT_MAX_LINES_PER_PAGE: usize = 80;

const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page {page} has {lines} lines, more than the maximum of {max}")]
    PageOverflow {
        page: usize,
        lines: usize,
        max: usize,
    },
    #[error("document has no pages")]
    Empty,
    #[error("failed to encode PDF: {0}")]
    Pdf(String),
}

/// Serializes rendered pages to PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfEmitter {
    pub geometry: PageGeometry,
    pub max_lines_per_page: usize,
    pub title: String,
}

impl PdfEmitter {
    pub fn new(geometry: PageGeometry, title: impl Into<String>) -> Self {
        Self {
            geometry,
            max_lines_per_page: DEFAULT_MAX_LINES_PER_PAGE,
            title: title.into(),
        }
    }

    pub fn emit(&self, pages: &[Page]) -> Result<Vec<u8>, RenderError> {
        if pages.is_empty() {
            return Err(RenderError::Empty);
        }
        for (i, page) in pages.iter().enumerate() {
            if page.lines.len() > self.max_lines_per_page {
                return Err(RenderError::PageOverflow {
                    page: i + 1,
                    lines: page.lines.len(),
                    max: self.max_lines_per_page,
                });
            }
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.page_content(page);
            let encoded = content
                .encode()
                .map_err(|e| RenderError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                self.geometry.page_width.into(),
                self.geometry.page_height.into(),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_text(&self.title)),
            "Producer" => Object::string_literal(PRODUCER),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        log::debug!("Emitted PDF with {} pages ({} bytes)", pages.len(), output.len());
        Ok(output)
    }

    fn page_content(&self, page: &Page) -> Content {
        let mut operations = Vec::new();

        for line in page.lines.iter().filter(|l| !l.text.is_empty()) {
            let font = match line.style {
                TextStyle::Title | TextStyle::Heading => "F2",
                TextStyle::Body => "F1",
            };
            let size = self.geometry.font_size(line.style);

            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
            operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_text(&line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        Content { operations }
    }
}

/// Map text onto single-byte WinAnsi codes; unsupported characters become '?'.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ if c.is_whitespace() => b' ',
            _ => b'?',
        })
        .collect()
}
