//! Document downloads through a headless Chrome/Chromium browser.
//!
//! One browser is launched per run. Chrome saves each download into the storage directory
//! under the download's guid and reports progress through browser events. A document is
//! bound to the first download that begins after its navigation, so a download abandoned
//! by an earlier document can never be mistaken for the current one.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    CancelDownloadParams, DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use crate::config::DownloadConfig;
use crate::error::ProcessingError;

use super::Downloader;

pub struct BrowserDownloader {
    browser: Browser,
    handler: JoinHandle<()>,
    download_dir: PathBuf,
    timeout: Duration,
}

impl BrowserDownloader {
    /// Launch the browser and point its downloads at `download_dir`.
    pub async fn launch(
        config: &DownloadConfig,
        download_dir: &Path,
    ) -> Result<Self, ProcessingError> {
        let download_dir = tokio::fs::canonicalize(download_dir).await?;

        let mut builder = BrowserConfig::builder()
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--ignore-certificate-errors");

        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(ProcessingError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(browser_error)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // Files are named by guid, progress is reported as events
        let behavior = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::AllowAndName)
            .download_path(download_dir.to_string_lossy().into_owned())
            .events_enabled(true)
            .build()
            .map_err(ProcessingError::Browser)?;

        let mut downloader = Self {
            browser,
            handler,
            download_dir,
            timeout: config.timeout(),
        };

        if let Err(e) = downloader.browser.execute(behavior).await {
            let message = e.to_string();
            downloader.close_browser().await;
            return Err(ProcessingError::Browser(message));
        }

        debug!(dir = %downloader.download_dir.display(), "Browser launched");

        Ok(downloader)
    }

    /// Close the browser and stop its event handler.
    pub async fn close(mut self) {
        self.close_browser().await;
    }

    async fn close_browser(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        self.handler.abort();
    }

    /// Navigate to `url` and wait for the download it starts, all within `deadline`.
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        deadline: Instant,
    ) -> Result<(), ProcessingError> {
        // Subscribe before navigating so the download's first event is not missed
        let began = self
            .browser
            .event_listener::<EventDownloadWillBegin>()
            .await
            .map_err(browser_error)?;
        let progress = self
            .browser
            .event_listener::<EventDownloadProgress>()
            .await
            .map_err(browser_error)?;

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(browser_error)?;

        // A link that turns into a download usually ends navigation with an error
        match timeout_at(deadline, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!(url = %url, error = %e, "Navigation did not settle on a page"),
            Err(_) => debug!(url = %url, "Navigation still pending at deadline"),
        }

        let began = began.map(|event| DownloadEvent::Began {
            guid: event.guid.clone(),
        });
        let progress = progress.map(|event| DownloadEvent::Progress {
            guid: event.guid.clone(),
            state: DownloadState::from(&event.state),
        });
        let mut events = futures::stream::select(began, progress);

        let result = match wait_for_download(&mut events, deadline).await {
            Outcome::Completed(guid) => move_download(&self.download_dir, &guid, destination).await,
            Outcome::Canceled(guid) => {
                debug!(guid = %guid, "Browser canceled download");
                Err(ProcessingError::Download {
                    url: url.to_string(),
                    message: "download canceled by the browser".to_string(),
                })
            }
            Outcome::Closed => Err(ProcessingError::Browser(
                "download event stream closed".to_string(),
            )),
            Outcome::TimedOut(guid) => {
                if let Some(guid) = guid {
                    self.cancel(&guid).await;
                }
                Err(ProcessingError::DownloadTimeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if let Err(e) = page.close().await {
            debug!(error = %e, "Failed to close tab");
        }

        result
    }

    async fn cancel(&self, guid: &str) {
        match self.browser.execute(CancelDownloadParams::new(guid)).await {
            Ok(_) => debug!(guid = %guid, "Canceled unfinished download"),
            Err(e) => warn!(guid = %guid, error = %e, "Failed to cancel download"),
        }
    }
}

impl Downloader for BrowserDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<(), ProcessingError> {
        let deadline = Instant::now() + self.timeout;
        self.fetch(url, destination, deadline).await
    }
}

fn browser_error(e: impl std::fmt::Display) -> ProcessingError {
    ProcessingError::Browser(e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DownloadState {
    InProgress,
    Completed,
    Canceled,
}

impl From<&DownloadProgressState> for DownloadState {
    fn from(state: &DownloadProgressState) -> Self {
        match state {
            DownloadProgressState::InProgress => Self::InProgress,
            DownloadProgressState::Completed => Self::Completed,
            DownloadProgressState::Canceled => Self::Canceled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DownloadEvent {
    Began { guid: String },
    Progress { guid: String, state: DownloadState },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Completed(String),
    Canceled(String),
    /// The browser stopped delivering events
    Closed,
    /// Deadline passed; carries the guid of the download left running, if one began
    TimedOut(Option<String>),
}

/// Follows the one download that belongs to the current document.
#[derive(Debug, Default)]
struct DownloadTracker {
    guid: Option<String>,
}

impl DownloadTracker {
    /// Feed one browser event; returns the outcome once the tracked download ends.
    ///
    /// The first download to begin is adopted. Events of any other download are ignored.
    fn observe(&mut self, event: DownloadEvent) -> Option<Outcome> {
        match event {
            DownloadEvent::Began { guid } => {
                if self.guid.is_none() {
                    debug!(guid = %guid, "Download started");
                    self.guid = Some(guid);
                } else {
                    debug!(guid = %guid, "Ignoring unrelated download");
                }
                None
            }
            DownloadEvent::Progress { guid, state } => {
                if self.guid.as_deref() != Some(guid.as_str()) {
                    return None;
                }
                match state {
                    DownloadState::InProgress => None,
                    DownloadState::Completed => Some(Outcome::Completed(guid)),
                    DownloadState::Canceled => Some(Outcome::Canceled(guid)),
                }
            }
        }
    }
}

/// Wait until the download started by the current navigation ends or `deadline` passes.
async fn wait_for_download<S>(events: &mut S, deadline: Instant) -> Outcome
where
    S: Stream<Item = DownloadEvent> + Unpin,
{
    let mut tracker = DownloadTracker::default();

    loop {
        match timeout_at(deadline, events.next()).await {
            Ok(Some(event)) => {
                if let Some(outcome) = tracker.observe(event) {
                    return outcome;
                }
            }
            Ok(None) => return Outcome::Closed,
            Err(_) => return Outcome::TimedOut(tracker.guid),
        }
    }
}

/// Move the finished download, saved under its guid, to `destination`.
async fn move_download(
    download_dir: &Path,
    guid: &str,
    destination: &Path,
) -> Result<(), ProcessingError> {
    let file = download_dir.join(guid);
    tokio::fs::rename(&file, destination).await?;
    debug!(from = %file.display(), to = %destination.display(), "Download complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tempfile::TempDir;
    use tokio::time::sleep;

    fn began(guid: &str) -> DownloadEvent {
        DownloadEvent::Began {
            guid: guid.to_string(),
        }
    }

    fn progress(guid: &str, state: DownloadState) -> DownloadEvent {
        DownloadEvent::Progress {
            guid: guid.to_string(),
            state,
        }
    }

    #[test]
    fn test_completion_of_tracked_download() {
        let mut tracker = DownloadTracker::default();

        assert_eq!(tracker.observe(began("b")), None);
        assert_eq!(tracker.observe(progress("b", DownloadState::InProgress)), None);
        assert_eq!(
            tracker.observe(progress("b", DownloadState::Completed)),
            Some(Outcome::Completed("b".to_string()))
        );
    }

    #[test]
    fn test_abandoned_download_finishing_late_is_ignored() {
        // Document A timed out with download "a" still running; it lands while B waits
        let mut tracker = DownloadTracker::default();

        assert_eq!(tracker.observe(progress("a", DownloadState::Completed)), None);
        assert_eq!(tracker.observe(began("b")), None);
        assert_eq!(tracker.observe(progress("a", DownloadState::Completed)), None);
        assert_eq!(tracker.guid.as_deref(), Some("b"));
        assert_eq!(
            tracker.observe(progress("b", DownloadState::Completed)),
            Some(Outcome::Completed("b".to_string()))
        );
    }

    #[test]
    fn test_second_download_does_not_replace_first() {
        let mut tracker = DownloadTracker::default();

        tracker.observe(began("b"));
        tracker.observe(began("c"));

        assert_eq!(tracker.guid.as_deref(), Some("b"));
        assert_eq!(tracker.observe(progress("c", DownloadState::Completed)), None);
    }

    #[test]
    fn test_canceled_download() {
        let mut tracker = DownloadTracker::default();

        tracker.observe(began("b"));

        assert_eq!(
            tracker.observe(progress("b", DownloadState::Canceled)),
            Some(Outcome::Canceled("b".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_navigation_shares_the_deadline() {
        let start = Instant::now();
        let deadline = start + Duration::from_secs(60);

        // Navigation hangs for most of the budget
        let _ = timeout_at(deadline, sleep(Duration::from_secs(50))).await;
        let mut events = stream::pending::<DownloadEvent>();
        let outcome = wait_for_download(&mut events, deadline).await;

        assert_eq!(outcome, Outcome::TimedOut(None));
        assert!(start.elapsed() < Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_running_download() {
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut events = stream::iter(vec![
            began("a"),
            progress("a", DownloadState::InProgress),
        ])
        .chain(stream::pending());

        let outcome = wait_for_download(&mut events, deadline).await;

        assert_eq!(outcome, Outcome::TimedOut(Some("a".to_string())));
    }

    #[tokio::test]
    async fn test_wait_ignores_stale_completion() {
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut events = stream::iter(vec![
            progress("a", DownloadState::Completed),
            began("b"),
            progress("b", DownloadState::Completed),
        ]);

        let outcome = wait_for_download(&mut events, deadline).await;

        assert_eq!(outcome, Outcome::Completed("b".to_string()));
    }

    #[tokio::test]
    async fn test_move_download_by_guid() {
        let dir = TempDir::new().unwrap();
        let guid = "6f0b7e52-4c2a-4b8e-9d57-1f2f4b1c9a10";
        std::fs::write(dir.path().join(guid), b"%PDF-1.7").unwrap();
        let destination = dir.path().join("S-2023-418.pdf");

        move_download(dir.path(), guid, &destination).await.unwrap();

        assert!(!dir.path().join(guid).exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_move_missing_download_fails() {
        let dir = TempDir::new().unwrap();

        let result = move_download(dir.path(), "missing", &dir.path().join("x.pdf")).await;

        assert!(result.is_err());
    }
}
