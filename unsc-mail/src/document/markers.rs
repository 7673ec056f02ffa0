use crate::i18n::Locale;

/// Fixed phrases that delimit structure in a document's first page.
#[derive(Debug)]
pub struct MarkerSet {
    /// Heading of the first section of a report; also excluded from titles
    pub introduction_heading: &'static str,
    /// Heading of the second section of a report
    pub second_section: &'static str,
    /// First numbered paragraph
    pub first_numbered_item: &'static str,
    /// Opening of a resolution's preamble
    pub resolution_opening: &'static str,
    /// Heading that precedes a meeting's agenda
    pub agenda_heading: &'static str,
    /// Agenda themes that are moved to the front of the agenda
    pub recurring_agenda_themes: [&'static str; 2],
    /// Start of a letter item within an agenda
    pub agenda_letter: &'static str,
    /// First word of the "Report of ..." part of a report title
    pub report_word: &'static str,
}

static RU: MarkerSet = MarkerSet {
    introduction_heading: "I. Введение",
    second_section: "II.",
    first_numbered_item: "1.",
    resolution_opening: "Совет Безопасности,",
    agenda_heading: "Повестка дня",
    recurring_agenda_themes: [
        "Угрозы международному миру и безопасности",
        "Поддержание международного мира и безопасности",
    ],
    agenda_letter: "Письмо",
    report_word: "Доклад",
};

static EN: MarkerSet = MarkerSet {
    introduction_heading: "I. Introduction",
    second_section: "II.",
    first_numbered_item: "1.",
    resolution_opening: "Security Council,",
    agenda_heading: "Agenda",
    recurring_agenda_themes: [
        "Threats to international peace and security",
        "Maintenance of international peace and security",
    ],
    agenda_letter: "Letter",
    report_word: "Report",
};

impl MarkerSet {
    pub fn for_locale(locale: Locale) -> &'static MarkerSet {
        match locale {
            Locale::En => &EN,
            Locale::Ru => &RU,
        }
    }
}
