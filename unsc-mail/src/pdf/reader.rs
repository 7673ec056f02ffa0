use std::path::Path;

use crate::error::ProcessingError;

/// Axis-aligned page region in points, origin at the top-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ClipRect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Whether the centre of `other` lies inside this rectangle.
    pub fn contains_center_of(&self, other: &ClipRect) -> bool {
        let x = (other.left + other.right) / 2.0;
        let y = (other.top + other.bottom) / 2.0;
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Text on one line sharing one style. Bold covers upright and italic bold alike.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
}

/// What a reader returns for the first page of a document.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    /// Total pages in the document
    pub page_count: usize,
    /// Text inside the text clip in reading order: lines end in `\n`,
    /// paragraph gaps are written as `"\n \n"`
    pub text: String,
    /// Spans inside the title clip in reading order; empty when no title clip was given
    pub title_spans: Vec<TextSpan>,
}

/// Access to the first page of a PDF file.
pub trait PdfReader {
    fn read_first_page(
        &self,
        path: &Path,
        text_clip: ClipRect,
        title_clip: Option<ClipRect>,
    ) -> Result<RawPage, ProcessingError>;
}
