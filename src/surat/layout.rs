//! Page layout for composed clauses.
//!
//! # Coordinate System
//!
//! Positions use the PDF convention: (0, 0) is the bottom-left corner of the
//! page and Y grows upward. The vertical cursor therefore starts at
//! `page_height - margin_top` and moves down as lines are placed.
//!
//! A block may be split across pages; only single lines are kept whole.

use super::clauses::{ClauseBlock, ClauseKind};

// =============================================================================
// Layout Constants
// =============================================================================

/// A4 portrait, in points.
const A4_WIDTH: f32 = 595.0;
const A4_HEIGHT: f32 = 842.0;

/// Line height as a multiple of font size.
const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Average glyph width as a fraction of font size. Digits are 0.556 em in
/// Helvetica and bold capitals run wider still.
const BODY_GLYPH_WIDTH: f32 = 0.56;
const BOLD_GLYPH_WIDTH: f32 = 0.68;

// =============================================================================
// Public Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Centered document title.
    Title,
    /// Bold section heading.
    Heading,
    Body,
}

/// Fixed page geometry, all values in points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub title_font_size: f32,
    pub heading_font_size: f32,
    pub body_font_size: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
            title_font_size: 14.0,
            heading_font_size: 12.0,
            body_font_size: 11.0,
        }
    }
}

impl PageGeometry {
    pub fn font_size(&self, style: TextStyle) -> f32 {
        match style {
            TextStyle::Title => self.title_font_size,
            TextStyle::Heading => self.heading_font_size,
            TextStyle::Body => self.body_font_size,
        }
    }

    pub fn line_height(&self, style: TextStyle) -> f32 {
        self.font_size(style) * LINE_HEIGHT_FACTOR
    }

    pub fn text_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Approximate width of one glyph in points.
    pub fn glyph_width(&self, style: TextStyle) -> f32 {
        let factor = match style {
            TextStyle::Title | TextStyle::Heading => BOLD_GLYPH_WIDTH,
            TextStyle::Body => BODY_GLYPH_WIDTH,
        };
        self.font_size(style) * factor
    }

    /// Approximate number of characters that fit on one line.
    pub fn chars_per_line(&self, style: TextStyle) -> usize {
        ((self.text_width() / self.glyph_width(style)).floor() as usize).max(10)
    }

    fn cursor_start(&self) -> f32 {
        self.page_height - self.margin_top
    }
}

/// A line of text anchored at its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub lines: Vec<PositionedLine>,
}

impl Page {
    /// True when no line carries visible text.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.text.trim().is_empty())
    }
}

// =============================================================================
// Renderer
// =============================================================================

struct Cursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl<'g> Cursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.cursor_start(),
        }
    }

    fn emit(&mut self, text: String, style: TextStyle) {
        let height = self.geometry.line_height(style);
        if self.y - height < self.geometry.margin_bottom {
            self.pages.push(Page::default());
            self.y = self.geometry.cursor_start();
        }

        let x = match style {
            TextStyle::Title => {
                let width = text.chars().count() as f32 * self.geometry.glyph_width(style);
                (self.geometry.margin_left + (self.geometry.text_width() - width) / 2.0)
                    .max(self.geometry.margin_left)
            }
            TextStyle::Heading | TextStyle::Body => self.geometry.margin_left,
        };

        self.y -= height;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PositionedLine {
                x,
                y: self.y,
                text,
                style,
            });
        }
    }

    /// Blank space between blocks. Never opens a page by itself; a gap that
    /// runs past the bottom margin makes the next line start a new page.
    fn gap(&mut self) {
        self.y -= self.geometry.line_height(TextStyle::Body);
    }

    fn finish(mut self) -> Vec<Page> {
        while self.pages.len() > 1 && self.pages.last().is_some_and(Page::is_blank) {
            self.pages.pop();
        }
        self.pages
    }
}

/// Lay out clause blocks onto pages.
pub fn render(blocks: &[ClauseBlock], geometry: &PageGeometry) -> Vec<Page> {
    let mut cursor = Cursor::new(geometry);

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            cursor.gap();
        }
        let title_style = if block.kind == ClauseKind::Header {
            TextStyle::Title
        } else {
            TextStyle::Heading
        };
        if !block.title.is_empty() {
            for line in wrap(&block.title, geometry.chars_per_line(title_style)) {
                cursor.emit(line, title_style);
            }
        }

        let body_style = if block.kind == ClauseKind::Header {
            TextStyle::Title
        } else {
            TextStyle::Body
        };
        for raw in &block.lines {
            for line in wrap(raw, geometry.chars_per_line(body_style)) {
                cursor.emit(line, body_style);
            }
        }
    }

    cursor.finish()
}

/// Greedy word wrap; continuation lines keep the original indentation.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let indent: String = text.chars().take_while(|c| c.is_whitespace()).collect();
    let indent_len = indent.chars().count();
    let mut lines = Vec::new();
    let mut current = indent.clone();

    for word in text.split_whitespace() {
        let current_len = current.chars().count();
        let word_len = word.chars().count();
        let has_words = current_len > indent_len;

        if has_words && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::replace(&mut current, indent.clone()));
        }

        if current.chars().count() > indent_len {
            current.push(' ');
        }

        if indent_len + word_len > max_chars {
            // Hard-split words that cannot fit on any line.
            let mut chars: Vec<char> = word.chars().collect();
            let room = max_chars.saturating_sub(indent_len).max(1);
            while chars.len() > room {
                let head: String = chars.drain(..room).collect();
                current.push_str(&head);
                lines.push(std::mem::replace(&mut current, indent.clone()));
            }
            current.extend(chars);
        } else {
            current.push_str(word);
        }
    }

    if current.chars().count() > indent_len {
        lines.push(current);
    }

    lines
}
