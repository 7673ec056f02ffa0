//! One relay run: feed → documents → Telegram, with operator reports along the way.

use chrono::{DateTime, FixedOffset};
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::document::FormattedMessage;
use crate::download::Downloader;
use crate::error::ServiceResult;
use crate::feed::FeedSource;
use crate::i18n::I18n;
use crate::pdf::PdfReader;
use crate::pipeline::Pipeline;
use crate::telegram::{Notifier, escape_html};

const REPORT_ENGAGE: &str = "ENGAGE";
const REPORT_FEED_UNAVAILABLE: &str = "FATAL: RSS unavailable";
const REPORT_FEED_STALE: &str = "CHECK: RSS old";
const REPORT_NO_DOCUMENTS: &str = "CHECK: No documents to download";
const REPORT_DELIVERY_FAILED: &str = "FAIL: Can't send TG Message";

/// Outcome counts of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries in the feed, agenda entries included
    pub feed_entries: usize,
    pub stale_feed: bool,
    pub formatted: usize,
    pub failed: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
}

pub struct MailService<'a, F, D, R, N> {
    config: &'a AppConfig,
    feed: &'a F,
    pipeline: Pipeline<'a, D, R>,
    notifier: &'a N,
}

impl<'a, F, D, R, N> MailService<'a, F, D, R, N>
where
    F: FeedSource,
    D: Downloader,
    R: PdfReader,
    N: Notifier,
{
    pub fn new(
        config: &'a AppConfig,
        feed: &'a F,
        downloader: &'a D,
        reader: &'a R,
        notifier: &'a N,
        i18n: &'a I18n,
    ) -> Self {
        Self {
            config,
            feed,
            pipeline: Pipeline::new(config, downloader, reader, i18n),
            notifier,
        }
    }

    /// Relay every new document in the feed. `now` is used for the freshness check.
    ///
    /// Only an unreachable feed or a failure to clean up fails the run; document and
    /// delivery failures are reported and counted.
    pub async fn run(&self, now: DateTime<FixedOffset>) -> ServiceResult<RunSummary> {
        let mut summary = RunSummary::default();

        self.report(REPORT_ENGAGE, true).await;

        let feed = match self.feed.fetch().await {
            Ok(feed) => feed,
            Err(e) => {
                error!(error = %e, "Feed unavailable");
                self.report(REPORT_FEED_UNAVAILABLE, false).await;
                return Err(e.into());
            }
        };
        summary.feed_entries = feed.entries.len();

        if feed.is_stale(self.config.feed.max_age(), now) {
            summary.stale_feed = true;
            warn!(updated = ?feed.updated, "Feed is stale");
            self.report(REPORT_FEED_STALE, true).await;

            if self.config.run.production {
                return Ok(summary);
            }
        }

        let mut messages = Vec::new();
        for result in self.pipeline.process(&feed.entries).await {
            match result {
                Ok(message) => messages.push(message),
                Err(e) => {
                    summary.failed += 1;
                    let report = format!("ERROR: {}", escape_html(&e.to_string()));
                    self.report(&report, false).await;
                }
            }
        }
        summary.formatted = messages.len();

        if messages.is_empty() {
            info!("No documents to deliver");
            self.report(REPORT_NO_DOCUMENTS, true).await;
        }

        self.deliver(&messages, &mut summary).await;

        if self.config.run.production {
            let removed = clear_dir(&self.config.storage.pdf_dir).await?;
            debug!(removed, dir = %self.config.storage.pdf_dir.display(), "Cleared PDF directory");
        }

        Ok(summary)
    }

    /// Send messages in order; only the first one notifies with sound.
    async fn deliver(&self, messages: &[FormattedMessage], summary: &mut RunSummary) {
        for (index, message) in messages.iter().enumerate() {
            let silent = index > 0;

            match self
                .notifier
                .send_document(&message.text, &message.file_path, silent)
                .await
            {
                Ok(()) => {
                    summary.delivered += 1;
                    info!(serial = %message.serial, silent, "Document delivered");
                }
                Err(e) => {
                    summary.delivery_failures += 1;
                    error!(serial = %message.serial, error = %e, "Delivery failed");
                    self.report(REPORT_DELIVERY_FAILED, false).await;
                }
            }
        }
    }

    async fn report(&self, text: &str, silent: bool) {
        if let Err(e) = self.notifier.send_report(text, silent).await {
            warn!(report = %text, error = %e, "Failed to send report");
        }
    }
}

/// Remove the files directly inside `dir`; returns how many were removed.
async fn clear_dir(dir: &Path) -> std::io::Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }

    Ok(removed)
}
