use chrono::Utc;
use tracing::info;

mod config;
mod document;
mod download;
mod error;
mod feed;
mod i18n;
mod pdf;
mod pipeline;
mod service;
mod telegram;
mod text;

use crate::config::load_config;
use crate::download::ConfiguredDownloader;
use crate::error::ServiceError;
use crate::feed::FeedClient;
use crate::i18n::I18n;
use crate::pdf::PdfiumReader;
use crate::service::MailService;
use crate::telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("Starting unsc-mail v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    let channel = config
        .telegram
        .delivery_channel(config.run.production)
        .ok_or_else(|| ServiceError::Config {
            message: "No delivery channel: set telegram.test_channel or run in production with \
                      telegram.use_production_channel"
                .to_string(),
        })?;

    info!(
        production = config.run.production,
        feed = %config.feed.active_url(),
        channel = %channel,
        locale = config.formatting.locale.as_str(),
        "Configuration loaded"
    );

    std::fs::create_dir_all(&config.storage.pdf_dir)?;

    let i18n = I18n::new();
    let feed = FeedClient::new(&config.feed)?;
    let notifier = TelegramClient::new(&config.telegram, channel)?;
    let reader = PdfiumReader::new()?;
    let downloader =
        ConfiguredDownloader::from_config(&config.download, &config.storage.pdf_dir).await?;

    let service = MailService::new(&config, &feed, &downloader, &reader, &notifier, &i18n);
    let result = service.run(Utc::now().fixed_offset()).await;

    downloader.close().await;

    let summary = result?;
    info!(
        entries = summary.feed_entries,
        stale = summary.stale_feed,
        formatted = summary.formatted,
        failed = summary.failed,
        delivered = summary.delivered,
        delivery_failures = summary.delivery_failures,
        "Run complete"
    );

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // RUST_LOG wins; otherwise info for this crate only
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("unsc_mail=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
