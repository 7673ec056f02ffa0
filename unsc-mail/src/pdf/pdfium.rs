//! First-page reading backed by PDFium.

use std::path::Path;

use pdfium_render::prelude::*;
use tracing::debug;

use crate::error::ProcessingError;

use super::layout::{self, TextRun};
use super::reader::{ClipRect, PdfReader, RawPage};

/// Create a new Pdfium instance (dynamically linked).
///
/// Searches for libpdfium in:
/// 1. Current directory (./libpdfium.so)
/// 2. vendor/pdfium/lib/
/// 3. System library paths
fn create_pdfium() -> Result<Pdfium, ProcessingError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "./vendor/pdfium/lib/",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ProcessingError::PdfiumUnavailable(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// [`PdfReader`] over the PDFium library.
pub struct PdfiumReader {
    pdfium: Pdfium,
}

impl PdfiumReader {
    pub fn new() -> Result<Self, ProcessingError> {
        Ok(Self {
            pdfium: create_pdfium()?,
        })
    }
}

impl PdfReader for PdfiumReader {
    fn read_first_page(
        &self,
        path: &Path,
        text_clip: ClipRect,
        title_clip: Option<ClipRect>,
    ) -> Result<RawPage, ProcessingError> {
        let load_error = |e: PdfiumError| ProcessingError::PdfLoad {
            path: path.to_path_buf(),
            message: format!("{:?}", e),
        };

        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(load_error)?;
        let page_count = document.pages().len() as usize;
        let page = document.pages().get(0).map_err(load_error)?;

        let runs = collect_text_runs(&page);
        debug!(
            path = %path.display(),
            pages = page_count,
            runs = runs.len(),
            "Read first PDF page"
        );

        Ok(RawPage {
            page_count,
            text: layout::text_in_reading_order(&runs, text_clip),
            title_spans: title_clip
                .map(|clip| layout::spans_in_reading_order(&runs, clip))
                .unwrap_or_default(),
        })
    }
}

/// Collect every text object on the page with its bounds flipped to a top-left origin.
fn collect_text_runs(page: &PdfPage) -> Vec<TextRun> {
    let page_height = page.height().value;
    let mut runs = Vec::new();

    for object in page.objects().iter() {
        if let PdfPageObject::Text(text_object) = &object
            && let Ok(quad_points) = text_object.bounds()
        {
            let rect = quad_points.to_rect();
            let font = text_object.font();
            let style = FontStyle::detect(&font.name(), font.weight().ok());

            runs.push(TextRun {
                text: text_object.text(),
                bounds: ClipRect::new(
                    rect.left().value,
                    page_height - rect.top().value,
                    rect.right().value,
                    page_height - rect.bottom().value,
                ),
                bold: style.bold,
                italic: style.italic,
            });
        }
    }

    runs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FontStyle {
    bold: bool,
    italic: bool,
}

impl FontStyle {
    /// Style from the PostScript font name (e.g. `TimesNewRomanPS-BoldItalicMT`) and the
    /// declared weight, when the font has one.
    fn detect(font_name: &str, weight: Option<PdfFontWeight>) -> Self {
        let name = font_name.to_lowercase();
        Self {
            bold: name.contains("bold") || weight.is_some_and(is_bold_weight),
            italic: name.contains("italic") || name.contains("oblique"),
        }
    }
}

fn is_bold_weight(weight: PdfFontWeight) -> bool {
    match weight {
        PdfFontWeight::Weight700Bold | PdfFontWeight::Weight800 | PdfFontWeight::Weight900 => true,
        PdfFontWeight::Custom(value) => value >= 700,
        _ => false,
    }
}
