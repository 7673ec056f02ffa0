use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// Languages documents are downloaded and summarized in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Ru,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

/// Caption labels using Fluent (thread-safe)
pub struct I18n {
    bundles: HashMap<Locale, FluentBundle<FluentResource>>,
}

impl I18n {
    /// Create a new i18n service with the embedded Russian and English labels
    pub fn new() -> Self {
        let mut i18n = Self {
            bundles: HashMap::new(),
        };

        for (locale, content) in [(Locale::Ru, RU_LABELS), (Locale::En, EN_LABELS)] {
            if let Err(e) = i18n.add_locale(locale, content) {
                warn!(locale = locale.as_str(), error = %e, "Failed to load embedded labels");
            }
        }

        i18n
    }

    /// Add a locale with translations
    fn add_locale(&mut self, locale: Locale, content: &str) -> Result<(), String> {
        let lang_id: LanguageIdentifier = locale
            .as_str()
            .parse()
            .map_err(|e| format!("Invalid locale '{}': {}", locale.as_str(), e))?;

        let resource = FluentResource::try_new(content.to_string())
            .map_err(|(_, errors)| format!("Failed to parse Fluent resource: {:?}", errors))?;

        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
        // Captions go to Telegram verbatim, no bidi isolation marks around arguments
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| format!("Failed to add resource to bundle: {:?}", errors))?;

        self.bundles.insert(locale, bundle);

        debug!(locale = locale.as_str(), "Loaded labels");

        Ok(())
    }

    /// Get a translated message, falling back to the key itself
    pub fn get(&self, locale: Locale, key: &str, args: Option<&FluentArgs>) -> String {
        self.try_get(locale, key, args)
            .unwrap_or_else(|| key.to_string())
    }

    fn try_get(&self, locale: Locale, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(&locale)?;
        let message = bundle.get_message(key)?;
        let pattern = message.value()?;

        let mut errors = vec![];
        let result = bundle.format_pattern(pattern, args, &mut errors);

        if !errors.is_empty() {
            warn!(key = %key, errors = ?errors, "Fluent formatting errors");
        }

        Some(result.to_string())
    }

    /// Get a translated message with string arguments
    pub fn format(&self, locale: Locale, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (k, v) in args {
            fluent_args.set(*k, *v);
        }
        self.get(locale, key, Some(&fluent_args))
    }

    /// Page count with the plural form the locale requires ("21 страница", "12 страниц").
    pub fn page_count(&self, locale: Locale, count: usize) -> String {
        let mut fluent_args = FluentArgs::new();
        fluent_args.set("count", count);
        self.get(locale, "page-count", Some(&fluent_args))
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

const RU_LABELS: &str = r#"
page-count = { $count ->
    [one] { $count } страница
    [few] { $count } страницы
   *[many] { $count } страниц
}

resolution-preamble = Совет безопасности,
draft-resolution-title = Проект резолюции, автор: { $sponsors }
meeting-record-title = Стенограмма заседания №{ $number }
meeting-record-resumed-title = Стенограмма заседания №{ $number } (продолжение)
agenda-label = Повестка дня:
council-work-report-title = Краткий отчёт Генерального секретаря о работе Совета Безопасности
"#;

const EN_LABELS: &str = r#"
page-count = { $count ->
    [one] { $count } page
   *[other] { $count } pages
}

resolution-preamble = The Security Council,
draft-resolution-title = Draft resolution submitted by: { $sponsors }
meeting-record-title = Meeting record No. { $number }
meeting-record-resumed-title = Meeting record No. { $number } (continued)
agenda-label = Agenda:
council-work-report-title = Summary statement by the Secretary-General on the work of the Security Council
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_singular() {
        let i18n = I18n::new();

        assert_eq!(i18n.page_count(Locale::Ru, 1), "1 страница");
        assert_eq!(i18n.page_count(Locale::Ru, 21), "21 страница");
        assert_eq!(i18n.page_count(Locale::En, 1), "1 page");
    }

    #[test]
    fn test_page_count_few_and_many() {
        let i18n = I18n::new();

        assert_eq!(i18n.page_count(Locale::Ru, 3), "3 страницы");
        assert_eq!(i18n.page_count(Locale::Ru, 24), "24 страницы");
        assert_eq!(i18n.page_count(Locale::Ru, 5), "5 страниц");
        assert_eq!(i18n.page_count(Locale::En, 12), "12 pages");
    }

    #[test]
    fn test_page_count_teens_use_many_form() {
        let i18n = I18n::new();

        // 11-14 end in 1..4 but take the genitive plural
        assert_eq!(i18n.page_count(Locale::Ru, 11), "11 страниц");
        assert_eq!(i18n.page_count(Locale::Ru, 12), "12 страниц");
        assert_eq!(i18n.page_count(Locale::Ru, 14), "14 страниц");
        assert_eq!(i18n.page_count(Locale::Ru, 112), "112 страниц");
    }

    #[test]
    fn test_format_message() {
        let i18n = I18n::new();

        let msg = i18n.format(Locale::En, "meeting-record-title", &[("number", "9333")]);
        assert_eq!(msg, "Meeting record No. 9333");
    }

    #[test]
    fn test_fallback_to_key() {
        let i18n = I18n::new();

        let msg = i18n.get(Locale::Ru, "nonexistent-key", None);
        assert_eq!(msg, "nonexistent-key");
    }
}
