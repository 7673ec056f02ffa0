//! Fetching document PDFs into the storage directory.
//!
//! Three strategies, selected by `download.mode`:
//! - `browser`: headless Chrome, for links that only resolve to a PDF after scripts run
//! - `http`: a plain GET of the localized link
//! - `existing`: no download at all, the PDF must already be in place (development)

mod browser;

use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{DownloadConfig, DownloadMode};
use crate::error::ProcessingError;

pub use browser::BrowserDownloader;

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF";

/// Fetches one document into a local file
pub trait Downloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ProcessingError>;
}

/// Insert the document language as the first path segment of a feed link.
///
/// `https://undocs.org/S/2023/418` becomes `https://undocs.org/ru/S/2023/418`.
pub fn localized_url(link: &str, language: Option<&str>) -> Result<String, ProcessingError> {
    let mut url = Url::parse(link).map_err(|_| ProcessingError::InvalidUrl {
        url: link.to_string(),
    })?;

    if let Some(language) = language.filter(|l| !l.is_empty()) {
        let path = format!("/{}{}", language, url.path());
        url.set_path(&path);
    }

    Ok(url.into())
}

/// File name for a serial number: `S/PV.9333 (Resumption 1)` becomes `S-PV-9333-Resumption-1.pdf`.
pub fn file_name_for(serial: &str) -> String {
    let mut name = String::with_capacity(serial.len() + 4);

    for c in serial.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            name.push(c);
        } else if !name.is_empty() && !name.ends_with('-') {
            name.push('-');
        }
    }

    let mut name = name.trim_end_matches('-').to_string();
    if name.is_empty() {
        name.push_str("document");
    }
    name.push_str(".pdf");
    name
}

/// Plain HTTP download
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
}

impl HttpDownloader {
    pub fn new(config: &DownloadConfig) -> Result<Self, ProcessingError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProcessingError::Download {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    fn request_error(&self, url: &str, error: reqwest::Error) -> ProcessingError {
        if error.is_timeout() {
            ProcessingError::DownloadTimeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ProcessingError::Download {
                url: url.to_string(),
                message: error.without_url().to_string(),
            }
        }
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ProcessingError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        if !response.status().is_success() {
            return Err(ProcessingError::Download {
                url: url.to_string(),
                message: format!("status {}", response.status().as_u16()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.request_error(url, e))?;

        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ProcessingError::Download {
                url: url.to_string(),
                message: "response is not a PDF".to_string(),
            });
        }

        tokio::fs::write(destination, &bytes).await?;

        debug!(url = %url, path = %destination.display(), bytes = bytes.len(), "Downloaded PDF");

        Ok(())
    }
}

/// Uses PDFs already present in the storage directory
pub struct ExistingFileDownloader;

impl Downloader for ExistingFileDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ProcessingError> {
        if tokio::fs::try_exists(destination).await? {
            debug!(path = %destination.display(), "Using existing PDF");
            Ok(())
        } else {
            Err(ProcessingError::Download {
                url: url.to_string(),
                message: format!("{} does not exist", destination.display()),
            })
        }
    }
}

/// The downloader selected by configuration
pub enum ConfiguredDownloader {
    Http(HttpDownloader),
    Browser(BrowserDownloader),
    Existing(ExistingFileDownloader),
}

impl ConfiguredDownloader {
    /// Build the downloader for `config.mode`. Browser mode launches Chrome.
    pub async fn from_config(
        config: &DownloadConfig,
        download_dir: &Path,
    ) -> Result<Self, ProcessingError> {
        let downloader = match config.mode {
            DownloadMode::Http => Self::Http(HttpDownloader::new(config)?),
            DownloadMode::Browser => {
                Self::Browser(BrowserDownloader::launch(config, download_dir).await?)
            }
            DownloadMode::Existing => Self::Existing(ExistingFileDownloader),
        };

        info!(mode = ?config.mode, dir = %download_dir.display(), "Downloader ready");

        Ok(downloader)
    }

    /// Release the browser, if one was launched.
    pub async fn close(self) {
        if let Self::Browser(browser) = self {
            browser.close().await;
        }
    }
}

impl Downloader for ConfiguredDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ProcessingError> {
        match self {
            Self::Http(downloader) => downloader.download(url, destination).await,
            Self::Browser(downloader) => downloader.download(url, destination).await,
            Self::Existing(downloader) => downloader.download(url, destination).await,
        }
    }
}

/// Path of the PDF for `serial` inside `dir`
pub fn destination_for(dir: &Path, serial: &str) -> PathBuf {
    dir.join(file_name_for(serial))
}
