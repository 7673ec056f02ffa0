mod loader;

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::i18n::Locale;

pub use loader::load_config;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default = "default_feed")]
    pub feed: FeedConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_download")]
    pub download: DownloadConfig,

    #[serde(default = "default_telegram")]
    pub telegram: TelegramConfig,

    #[serde(default = "default_formatting")]
    pub formatting: FormattingConfig,
}

/// Run mode switches
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    /// Production runs abort on a stale feed and delete PDFs after delivery.
    #[serde(default)]
    pub production: bool,
}

/// RSS feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// Alternate feed used while developing
    #[serde(default)]
    pub test_url: Option<String>,

    #[serde(default)]
    pub use_test_feed: bool,

    /// Feeds whose last update is older than this are considered stale
    #[serde(default = "default_feed_max_age_secs")]
    pub max_age_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl FeedConfig {
    /// The feed URL for this run.
    pub fn active_url(&self) -> &str {
        match (&self.test_url, self.use_test_feed) {
            (Some(test_url), true) => test_url,
            _ => &self.url,
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory downloaded PDFs are written to
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,
}

/// How documents are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Plain HTTP GET of the document link
    Http,
    /// Headless Chrome, for links that only resolve in a browser
    Browser,
    /// Expect the PDF to already be present in the PDF directory
    Existing,
}

/// Document download configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_mode")]
    pub mode: DownloadMode,

    /// Budget per document, navigation and download together
    #[serde(default = "default_download_timeout_secs")]
    pub timeout_secs: u64,

    /// Language segment inserted into document links (e.g. "ru"). None keeps links untouched.
    #[serde(default = "default_document_language")]
    pub document_language: Option<String>,

    /// Chrome/Chromium executable for browser mode; autodetected when unset
    #[serde(default)]
    pub chrome_path: Option<String>,
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,

    #[serde(default = "default_telegram_api_url")]
    pub api_base_url: String,

    #[serde(default = "default_production_channel")]
    pub production_channel: String,

    #[serde(default)]
    pub test_channel: Option<String>,

    /// Post to the production channel (only honoured in production runs)
    #[serde(default)]
    pub use_production_channel: bool,

    /// Chat receiving operational reports. Reports are only logged when unset.
    #[serde(default)]
    pub report_chat_id: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl TelegramConfig {
    /// Channel documents are posted to for the given run mode.
    pub fn delivery_channel(&self, production: bool) -> Option<&str> {
        if production && self.use_production_channel {
            Some(&self.production_channel)
        } else {
            self.test_channel.as_deref()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Message formatting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FormattingConfig {
    /// Language of the downloaded documents and of the generated captions
    #[serde(default)]
    pub locale: Locale,

    /// Maximum characters of a description before it is cut
    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            feed: default_feed(),
            storage: default_storage(),
            download: default_download(),
            telegram: default_telegram(),
            formatting: default_formatting(),
        }
    }
}

// ==================== Default Value Functions ====================

fn default_feed() -> FeedConfig {
    FeedConfig {
        url: default_feed_url(),
        test_url: None,
        use_test_feed: false,
        max_age_secs: default_feed_max_age_secs(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_feed_url() -> String {
    "https://undocs.org/rss/scdocs.xml".to_string()
}

fn default_feed_max_age_secs() -> u64 {
    12 * 60 * 60
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        pdf_dir: default_pdf_dir(),
    }
}

fn default_pdf_dir() -> PathBuf {
    PathBuf::from("./pdf")
}

fn default_download() -> DownloadConfig {
    DownloadConfig {
        mode: default_download_mode(),
        timeout_secs: default_download_timeout_secs(),
        document_language: default_document_language(),
        chrome_path: None,
    }
}

fn default_download_mode() -> DownloadMode {
    DownloadMode::Browser
}

fn default_download_timeout_secs() -> u64 {
    60
}

fn default_document_language() -> Option<String> {
    Some("ru".to_string())
}

fn default_telegram() -> TelegramConfig {
    TelegramConfig {
        bot_token: String::new(),
        api_base_url: default_telegram_api_url(),
        production_channel: default_production_channel(),
        test_channel: None,
        use_production_channel: false,
        report_chat_id: None,
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_production_channel() -> String {
    "@unsc_mail".to_string()
}

fn default_formatting() -> FormattingConfig {
    FormattingConfig {
        locale: Locale::default(),
        max_description_chars: default_max_description_chars(),
    }
}

fn default_max_description_chars() -> usize {
    750
}
