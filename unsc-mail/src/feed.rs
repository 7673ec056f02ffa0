//! The undocs.org RSS feed of newly published Security Council documents.

use chrono::{DateTime, FixedOffset};
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::error::FeedError;

/// One published document
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// Serial number, taken from the item title
    pub serial: String,
    pub link: String,
    pub description: String,
}

/// A fetched feed, entries in feed order
#[derive(Debug, Clone, Default)]
pub struct Feed {
    /// Build or publication date of the channel, if it carries a parseable one
    pub updated: Option<DateTime<FixedOffset>>,
    pub entries: Vec<FeedEntry>,
}

impl Feed {
    /// Parse an RSS 2.0 document.
    pub fn parse(xml: &str) -> Result<Self, FeedError> {
        let rss: Rss = from_str(xml)?;
        let channel = rss.channel;

        let updated = channel
            .last_build_date
            .as_deref()
            .or(channel.pub_date.as_deref())
            .and_then(|date| match DateTime::parse_from_rfc2822(date.trim()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(date = %date, error = %e, "Unparseable feed date");
                    None
                }
            });

        let entries = channel
            .items
            .into_iter()
            .map(|item| FeedEntry {
                serial: item.title.trim().to_string(),
                link: item.link.trim().to_string(),
                description: item.description.trim().to_string(),
            })
            .collect();

        Ok(Self { updated, entries })
    }

    /// True when the feed is older than `max_age` at `now`. An undated feed counts as stale.
    pub fn is_stale(&self, max_age: Duration, now: DateTime<FixedOffset>) -> bool {
        let Some(updated) = self.updated else {
            return true;
        };

        match (now - updated).to_std() {
            Ok(age) => age > max_age,
            // Dated in the future
            Err(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "lastBuildDate", default)]
    last_build_date: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
}

/// Source of the document feed
pub trait FeedSource {
    async fn fetch(&self) -> Result<Feed, FeedError>;
}

/// Fetches the feed over HTTP
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            url: config.active_url().to_string(),
        })
    }
}

impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<Feed, FeedError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let feed = Feed::parse(&body)?;

        debug!(url = %self.url, entries = feed.entries.len(), updated = ?feed.updated, "Fetched feed");

        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Security Council documents</title>
    <link>https://undocs.org</link>
    <description>Latest documents</description>
    <lastBuildDate>Mon, 05 Jun 2023 14:30:00 +0000</lastBuildDate>
    <item>
      <title>S/2023/418</title>
      <link>https://undocs.org/S/2023/418</link>
      <description>LETTER DATED 5 JUNE 2023 FROM THE PERMANENT REPRESENTATIVE OF UKRAINE</description>
    </item>
    <item>
      <title> S/PV.9333 (Resumption 1) </title>
      <link>https://undocs.org/S/PV.9333(Resumption1)</link>
      <description></description>
    </item>
  </channel>
</rss>"#;

    fn at(date: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(date).unwrap()
    }

    #[test]
    fn test_parse_entries_in_order() {
        let feed = Feed::parse(FEED).unwrap();

        assert_eq!(feed.entries.len(), 2);
        assert_eq!(
            feed.entries[0],
            FeedEntry {
                serial: "S/2023/418".to_string(),
                link: "https://undocs.org/S/2023/418".to_string(),
                description: "LETTER DATED 5 JUNE 2023 FROM THE PERMANENT REPRESENTATIVE OF UKRAINE"
                    .to_string(),
            }
        );
        assert_eq!(feed.entries[1].serial, "S/PV.9333 (Resumption 1)");
        assert_eq!(feed.entries[1].description, "");
        assert_eq!(feed.updated, Some(at("2023-06-05T14:30:00Z")));
    }

    #[test]
    fn test_staleness() {
        let feed = Feed::parse(FEED).unwrap();
        let max_age = Duration::from_secs(12 * 60 * 60);

        assert!(!feed.is_stale(max_age, at("2023-06-05T20:00:00Z")));
        assert!(feed.is_stale(max_age, at("2023-06-06T08:00:00Z")));
        assert!(!feed.is_stale(max_age, at("2023-06-05T10:00:00Z")));
    }

    #[test]
    fn test_undated_feed_is_stale() {
        let feed = Feed::parse("<rss><channel><title>x</title></channel></rss>").unwrap();

        assert!(feed.entries.is_empty());
        assert!(feed.is_stale(Duration::from_secs(43200), at("2023-06-05T20:00:00Z")));
    }

    #[test]
    fn test_pub_date_fallback() {
        let feed = Feed::parse(
            "<rss><channel><pubDate>Mon, 05 Jun 2023 14:30:00 GMT</pubDate></channel></rss>",
        )
        .unwrap();

        assert_eq!(feed.updated, Some(at("2023-06-05T14:30:00Z")));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            Feed::parse("<rss><channel>"),
            Err(FeedError::Parse(_))
        ));
    }
}
