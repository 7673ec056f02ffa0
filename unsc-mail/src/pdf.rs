//! PDF first-page extraction.
//!
//! This module handles reading the first page of a downloaded document:
//! - Clipped text in reading order, with paragraph gaps preserved
//! - Styled text spans for bold title detection
//! - Title/body/footer assembly for caption formatting

mod layout;
mod page;
mod pdfium;
mod reader;

pub use page::{ExtractedPage, PageLayout, extract_page};
pub use pdfium::PdfiumReader;
pub use reader::{ClipRect, PdfReader, RawPage, TextSpan};
