use tracing::debug;

use crate::document::{Document, MarkerSet};
use crate::error::ProcessingError;
use crate::i18n::{I18n, Locale};
use crate::text;

use super::reader::{ClipRect, PdfReader, TextSpan};

/// Where to look for body text and the bold title on the first page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub text_clip: ClipRect,
    /// None disables title detection
    pub title_clip: Option<ClipRect>,
}

/// Title, body and footer pulled from the first page of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    /// Bold title, empty when none was found or title detection is disabled
    pub title: String,
    /// Normalized body text with the title removed
    pub text: String,
    /// `"\n\n*<serial>, <page count>*"`
    pub footer: String,
}

/// Read the first page of `document` and split it into title, body and footer.
pub fn extract_page(
    reader: &impl PdfReader,
    document: &Document,
    layout: PageLayout,
    i18n: &I18n,
    locale: Locale,
) -> Result<ExtractedPage, ProcessingError> {
    let raw = reader.read_first_page(&document.file_path, layout.text_clip, layout.title_clip)?;
    let markers = MarkerSet::for_locale(locale);

    let title = compose_title(&raw.title_spans, markers.introduction_heading);
    let text = strip_title(text::normalize(&raw.text), &title);
    let footer = format!(
        "\n\n*{}, {}*",
        document.serial,
        i18n.page_count(locale, raw.page_count)
    );

    debug!(
        serial = %document.serial,
        title_chars = title.chars().count(),
        text_chars = text.chars().count(),
        "Extracted first page"
    );

    Ok(ExtractedPage {
        title,
        text,
        footer,
    })
}

/// Join the bold spans, upright or italic, skipping blank ones and the recurring
/// introduction heading.
fn compose_title(spans: &[TextSpan], introduction_heading: &str) -> String {
    let mut title = String::new();

    for span in spans {
        let trimmed = span.text.trim();
        if span.bold && !trimmed.is_empty() && !span.text.contains(introduction_heading) {
            title.push_str(trimmed);
            title.push(' ');
        }
    }

    title.trim().to_string()
}

/// Drop everything up to and including the first occurrence of the title.
fn strip_title(text: String, title: &str) -> String {
    if title.is_empty() {
        return text;
    }

    match text.find(title) {
        Some(start) => text[start + title.len()..].trim().to_string(),
        None => {
            debug!("Title not found in body text, keeping body as is");
            text
        }
    }
}
