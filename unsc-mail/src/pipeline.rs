//! Per-entry processing: download, classify, extract, format.
//!
//! Entries are handled one at a time in feed order. A failing entry yields an error for
//! that entry only; the rest of the batch is still processed.

use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::document::{
    Document, FormatContext, FormattedMessage, classify, format_message, is_excluded,
};
use crate::download::{Downloader, destination_for, localized_url};
use crate::error::{DocumentError, ProcessingError};
use crate::feed::FeedEntry;
use crate::i18n::I18n;
use crate::pdf::{PdfReader, extract_page};

pub struct Pipeline<'a, D, R> {
    config: &'a AppConfig,
    downloader: &'a D,
    reader: &'a R,
    i18n: &'a I18n,
}

impl<'a, D: Downloader, R: PdfReader> Pipeline<'a, D, R> {
    pub fn new(config: &'a AppConfig, downloader: &'a D, reader: &'a R, i18n: &'a I18n) -> Self {
        Self {
            config,
            downloader,
            reader,
            i18n,
        }
    }

    /// Process every entry that is not excluded, in order.
    pub async fn process(
        &self,
        entries: &[FeedEntry],
    ) -> Vec<Result<FormattedMessage, DocumentError>> {
        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            if is_excluded(&entry.serial) {
                debug!(serial = %entry.serial, "Skipping agenda entry");
                continue;
            }

            let result = self
                .process_entry(entry)
                .await
                .map_err(|e| DocumentError::new(&entry.serial, e));

            match &result {
                Ok(message) => info!(
                    serial = %entry.serial,
                    missing_markers = message.missing_markers.len(),
                    "Document formatted"
                ),
                Err(e) if e.is_recoverable() => {
                    warn!(serial = %entry.serial, error = %e.source, "Document skipped, retry next run")
                }
                Err(e) => error!(serial = %entry.serial, error = %e.source, "Document failed"),
            }

            results.push(result);
        }

        results
    }

    async fn process_entry(&self, entry: &FeedEntry) -> Result<FormattedMessage, ProcessingError> {
        let url = localized_url(
            &entry.link,
            self.config.download.document_language.as_deref(),
        )?;
        let file_path = destination_for(&self.config.storage.pdf_dir, &entry.serial);

        self.downloader.download(&url, &file_path).await?;

        let kind = classify(&entry.serial, &entry.description);
        let document = Document::new(&entry.serial, file_path, kind);
        debug!(serial = %document.serial, kind = ?kind, "Classified document");

        let locale = self.config.formatting.locale;
        let page = extract_page(
            self.reader,
            &document,
            kind.page_layout(),
            self.i18n,
            locale,
        )?;

        let ctx = FormatContext {
            i18n: self.i18n,
            locale,
            max_chars: self.config.formatting.max_description_chars,
        };

        Ok(format_message(&document, &page, &ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::pdf::{ClipRect, RawPage, TextSpan};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Records requested URLs; fails for URLs containing `fail_on`.
    #[derive(Default)]
    struct FakeDownloader {
        requested: Mutex<Vec<(String, PathBuf)>>,
        fail_on: Option<&'static str>,
    }

    impl Downloader for FakeDownloader {
        async fn download(&self, url: &str, destination: &Path) -> Result<(), ProcessingError> {
            self.requested
                .lock()
                .unwrap()
                .push((url.to_string(), destination.to_path_buf()));

            match self.fail_on {
                Some(fragment) if url.contains(fragment) => Err(ProcessingError::DownloadTimeout {
                    url: url.to_string(),
                    timeout_secs: 60,
                }),
                _ => Ok(()),
            }
        }
    }

    /// Serves the same resolution page for every file.
    struct FakeReader;

    impl PdfReader for FakeReader {
        fn read_first_page(
            &self,
            _path: &Path,
            _text_clip: ClipRect,
            _title_clip: Option<ClipRect>,
        ) -> Result<RawPage, ProcessingError> {
            Ok(RawPage {
                page_count: 3,
                text: "Resolution 2686 (2023)\n \nSecurity Council,\n \nPara one.\n \nPara two.\n \nPara three."
                    .to_string(),
                title_spans: vec![TextSpan {
                    text: "Resolution 2686 (2023)".to_string(),
                    bold: true,
                }],
            })
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.formatting.locale = Locale::En;
        config.storage.pdf_dir = PathBuf::from("pdf");
        config
    }

    fn entry(serial: &str, link: &str) -> FeedEntry {
        FeedEntry {
            serial: serial.to_string(),
            link: link.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_agenda_entry_is_never_downloaded() {
        let config = config();
        let downloader = FakeDownloader::default();
        let i18n = I18n::new();
        let pipeline = Pipeline::new(&config, &downloader, &FakeReader, &i18n);

        let results = pipeline
            .process(&[entry("S/2023/418 (AGENDA)", "https://undocs.org/S/2023/418")])
            .await;

        assert!(results.is_empty());
        assert!(downloader.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_end_to_end() {
        let config = config();
        let downloader = FakeDownloader::default();
        let i18n = I18n::new();
        let pipeline = Pipeline::new(&config, &downloader, &FakeReader, &i18n);

        let results = pipeline
            .process(&[entry("S/RES/2686 (2023)", "https://undocs.org/S/RES/2686(2023)")])
            .await;

        assert_eq!(results.len(), 1);
        let message = results[0].as_ref().unwrap();
        assert_eq!(
            message.text,
            "*Resolution 2686 (2023)*\n\nThe Security Council,\n\nPara one.\n\nPara two.\n\n*S/RES/2686 (2023), 3 pages*"
        );
        assert_eq!(message.file_path, PathBuf::from("pdf/S-RES-2686-2023.pdf"));

        let requested = downloader.requested.lock().unwrap();
        assert_eq!(requested[0].0, "https://undocs.org/ru/S/RES/2686(2023)");
    }

    #[tokio::test]
    async fn test_failed_download_does_not_abort_batch() {
        let config = config();
        let downloader = FakeDownloader {
            fail_on: Some("S/2023/418"),
            ..Default::default()
        };
        let i18n = I18n::new();
        let pipeline = Pipeline::new(&config, &downloader, &FakeReader, &i18n);

        let results = pipeline
            .process(&[
                entry("S/2023/418", "https://undocs.org/S/2023/418"),
                entry("S/RES/2686 (2023)", "https://undocs.org/S/RES/2686(2023)"),
            ])
            .await;

        assert_eq!(results.len(), 2);
        let error = results[0].as_ref().unwrap_err();
        assert_eq!(error.serial, "S/2023/418");
        assert!(error.is_recoverable());
        assert!(results[1].is_ok());
    }

    #[tokio::test]
    async fn test_invalid_link_is_reported_for_entry() {
        let config = config();
        let downloader = FakeDownloader::default();
        let i18n = I18n::new();
        let pipeline = Pipeline::new(&config, &downloader, &FakeReader, &i18n);

        let results = pipeline.process(&[entry("S/2023/420", "undocs.org")]).await;

        assert!(matches!(
            results[0],
            Err(DocumentError {
                source: ProcessingError::InvalidUrl { .. },
                ..
            })
        ));
        assert!(downloader.requested.lock().unwrap().is_empty());
    }
}
