//! Caption composition, one strategy per document kind.
//!
//! A caption is `title block + body + footer`. The body always goes through
//! [`trim_message`]; the footer is appended untouched. Marker phrases that cannot be found
//! never shift a slice: the miss is recorded on the message and the strategy falls back to
//! the nearest sensible boundary (start or end of the text).

use std::path::PathBuf;

use tracing::warn;

use crate::i18n::{I18n, Locale};
use crate::pdf::{ClipRect, ExtractedPage, PageLayout};
use crate::text::{extract_paragraphs, trim_message};

use super::{Document, DocumentKind, MarkerSet};

/// First-page body region
const BODY_CLIP: ClipRect = ClipRect::new(0.0, 220.0, 10000.0, 720.0);
/// First-page title region
const TITLE_CLIP: ClipRect = ClipRect::new(0.0, 220.0, 10000.0, 400.0);
/// Agenda region of a meeting record
const AGENDA_CLIP: ClipRect = ClipRect::new(0.0, 480.0, 10000.0, 600.0);

/// Paragraphs quoted from a document body
const DESCRIPTION_PARAGRAPHS: usize = 2;

/// Length of the ": draft resolution" suffix on draft resolution titles
const DRAFT_TITLE_SUFFIX_CHARS: usize = 18;

/// Keyword in a meeting record serial marking a resumed meeting
const RESUMPTION_MARKER: &str = "resumption";

impl DocumentKind {
    /// Page regions this kind of document is read from.
    pub fn page_layout(&self) -> PageLayout {
        match self {
            DocumentKind::Letter
            | DocumentKind::Resolution
            | DocumentKind::DraftResolution
            | DocumentKind::Report => PageLayout {
                text_clip: BODY_CLIP,
                title_clip: Some(TITLE_CLIP),
            },
            DocumentKind::Transcript => PageLayout {
                text_clip: AGENDA_CLIP,
                title_clip: None,
            },
            DocumentKind::CouncilWorkReport => PageLayout {
                text_clip: BODY_CLIP,
                title_clip: None,
            },
        }
    }
}

/// Settings shared by all caption strategies
pub struct FormatContext<'a> {
    pub i18n: &'a I18n,
    pub locale: Locale,
    /// Maximum characters of the caption body
    pub max_chars: usize,
}

/// A finished caption paired with the PDF it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedMessage {
    pub serial: String,
    pub text: String,
    pub file_path: PathBuf,
    /// Marker phrases that were expected but absent from the page
    pub missing_markers: Vec<&'static str>,
}

/// Compose the caption for `document` from its extracted first page.
pub fn format_message(
    document: &Document,
    page: &ExtractedPage,
    ctx: &FormatContext,
) -> FormattedMessage {
    let markers = MarkerSet::for_locale(ctx.locale);
    let mut lookup = MarkerLookup::new(&document.serial);

    let caption = match document.kind {
        DocumentKind::Letter => format!(
            "{}{}",
            title_block(&page.title),
            description(&page.text, 0, ctx)
        ),
        DocumentKind::Resolution => format!(
            "{}{}",
            title_block(&page.title),
            resolution_body(&page.text, markers, ctx, &mut lookup)
        ),
        DocumentKind::DraftResolution => {
            let sponsors = drop_last_chars(&page.title, DRAFT_TITLE_SUFFIX_CHARS).trim();
            // No sponsors, no title line
            let title = if sponsors.is_empty() {
                String::new()
            } else {
                ctx.i18n.format(
                    ctx.locale,
                    "draft-resolution-title",
                    &[("sponsors", sponsors)],
                )
            };
            format!(
                "{}{}",
                title_block(&title),
                resolution_body(&page.text, markers, ctx, &mut lookup)
            )
        }
        DocumentKind::Transcript => {
            let title = meeting_record_title(&document.serial, ctx, &mut lookup);
            let agenda_start = lookup
                .find_end(&page.text, markers.agenda_heading)
                .unwrap_or(0);
            let agenda = promote_agenda_items(&page.text[agenda_start..], markers);
            format!(
                "{}{} {}",
                title_block(&title),
                ctx.i18n.get(ctx.locale, "agenda-label", None),
                trim_message(&agenda, ctx.max_chars)
            )
        }
        DocumentKind::Report => {
            let title = report_title(&page.title, markers, &mut lookup);
            let introduction = report_introduction(&page.text, markers, &mut lookup);
            format!("{}{}", title, description(introduction, 0, ctx))
        }
        DocumentKind::CouncilWorkReport => format!(
            "*{}*",
            ctx.i18n.get(ctx.locale, "council-work-report-title", None)
        ),
    };

    FormattedMessage {
        serial: document.serial.clone(),
        text: caption + &page.footer,
        file_path: document.file_path.clone(),
        missing_markers: lookup.missing,
    }
}

/// Marker search that records every miss.
struct MarkerLookup<'a> {
    serial: &'a str,
    missing: Vec<&'static str>,
}

impl<'a> MarkerLookup<'a> {
    fn new(serial: &'a str) -> Self {
        Self {
            serial,
            missing: Vec::new(),
        }
    }

    /// Byte offset of `marker` in `haystack`.
    fn find(&mut self, haystack: &str, marker: &'static str) -> Option<usize> {
        let found = haystack.find(marker);
        if found.is_none() {
            warn!(serial = %self.serial, marker, "Marker phrase not found");
            self.missing.push(marker);
        }
        found
    }

    /// Byte offset just past `marker` in `haystack`.
    fn find_end(&mut self, haystack: &str, marker: &'static str) -> Option<usize> {
        self.find(haystack, marker).map(|pos| pos + marker.len())
    }
}

fn title_block(title: &str) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!("*{}*\n\n", title)
    }
}

fn description(text: &str, start: usize, ctx: &FormatContext) -> String {
    trim_message(
        extract_paragraphs(text, DESCRIPTION_PARAGRAPHS, start),
        ctx.max_chars,
    )
}

/// Fixed preamble followed by the paragraphs after the resolution's opening phrase.
fn resolution_body(
    text: &str,
    markers: &MarkerSet,
    ctx: &FormatContext,
    lookup: &mut MarkerLookup,
) -> String {
    let start = lookup
        .find_end(text, markers.resolution_opening)
        .unwrap_or(0);

    format!(
        "{}\n\n{}",
        ctx.i18n.get(ctx.locale, "resolution-preamble", None),
        description(text, start, ctx)
    )
}

/// "Meeting record No. 9333", with the continued form for resumed meetings.
fn meeting_record_title(serial: &str, ctx: &FormatContext, lookup: &mut MarkerLookup) -> String {
    let number = &serial[lookup.find_end(serial, ".").unwrap_or(0)..];

    let (number, key) = match number.find('(') {
        Some(paren) if number[paren..].to_lowercase().contains(RESUMPTION_MARKER) => {
            (number[..paren].trim(), "meeting-record-resumed-title")
        }
        _ => (number.trim(), "meeting-record-title"),
    };

    ctx.i18n.format(ctx.locale, key, &[("number", number)])
}

/// Move a recurring theme to the front of the agenda and put a letter item on its own line.
fn promote_agenda_items(agenda: &str, markers: &MarkerSet) -> String {
    let mut agenda = agenda.trim().to_string();

    for theme in markers.recurring_agenda_themes {
        if let Some(pos) = agenda.find(theme) {
            agenda = format!("{}\n\n{}", theme, agenda[pos + theme.len()..].trim());
        }
    }

    if let Some(pos) = agenda.find(markers.agenda_letter) {
        let (before, letter) = agenda.split_at(pos);
        agenda = if before.trim().is_empty() {
            letter.trim().to_string()
        } else {
            format!("{}\n\n{}", before.trim(), letter.trim())
        };
    }

    agenda
}

/// "*Report of the Secretary-General «Situation in Mali»*" from "Situation in Mali Report of ...".
fn report_title(title: &str, markers: &MarkerSet, lookup: &mut MarkerLookup) -> String {
    if title.is_empty() {
        return String::new();
    }

    match lookup.find(title, markers.report_word) {
        Some(pos) if pos > 0 => format!("*{} «{}»*\n\n", &title[pos..], title[..pos].trim()),
        _ => title_block(title),
    }
}

/// Text of the introduction section, from its first numbered paragraph up to section II.
fn report_introduction<'t>(
    text: &'t str,
    markers: &MarkerSet,
    lookup: &mut MarkerLookup,
) -> &'t str {
    let heading = lookup
        .find(text, markers.introduction_heading)
        .unwrap_or(0);
    let start = lookup
        .find_end(&text[heading..], markers.first_numbered_item)
        .map_or(heading, |offset| heading + offset);
    let end = lookup
        .find(&text[start..], markers.second_section)
        .map_or(text.len(), |offset| start + offset);

    text[start..end].trim()
}

fn drop_last_chars(text: &str, count: usize) -> &str {
    let keep = text.chars().count().saturating_sub(count);
    text.char_indices()
        .nth(keep)
        .map_or(text, |(index, _)| &text[..index])
}
