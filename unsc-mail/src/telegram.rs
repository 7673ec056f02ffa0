//! Delivery through the Telegram Bot API.

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::error::DeliveryError;

/// Destination for captions and operator reports
pub trait Notifier {
    /// Post a PDF with its caption to the delivery channel.
    async fn send_document(
        &self,
        caption: &str,
        file: &Path,
        silent: bool,
    ) -> Result<(), DeliveryError>;

    /// Send a short status report to the operator.
    async fn send_report(&self, text: &str, silent: bool) -> Result<(), DeliveryError>;
}

/// Bot API client
pub struct TelegramClient {
    client: Client,
    api_base_url: String,
    bot_token: String,
    channel: String,
    report_chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_notification: bool,
}

impl TelegramClient {
    /// Create a client posting documents to `channel`.
    pub fn new(config: &TelegramConfig, channel: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            channel: channel.into(),
            report_chat_id: config.report_chat_id.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.bot_token, method)
    }

    /// Check the `{ok, description}` envelope of a Bot API reply.
    async fn check_reply(response: reqwest::Response) -> Result<(), DeliveryError> {
        let status = response.status().as_u16();
        let reply: ApiReply = response.json().await.map_err(without_url)?;

        if reply.ok {
            Ok(())
        } else {
            Err(DeliveryError::Api {
                status,
                description: reply.description.unwrap_or_default(),
            })
        }
    }
}

/// Request URLs carry the bot token; keep it out of error messages.
fn without_url(error: reqwest::Error) -> DeliveryError {
    DeliveryError::Request(error.without_url())
}

impl Notifier for TelegramClient {
    async fn send_document(
        &self,
        caption: &str,
        file: &Path,
        silent: bool,
    ) -> Result<(), DeliveryError> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map_or_else(|| "document.pdf".to_string(), |name| name.to_string_lossy().into_owned());

        let document = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(without_url)?;

        let form = Form::new()
            .text("chat_id", self.channel.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "Markdown")
            .text("disable_notification", silent.to_string())
            .part("document", document);

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(without_url)?;

        Self::check_reply(response).await?;

        debug!(channel = %self.channel, file = %file.display(), silent, "Document sent");

        Ok(())
    }

    async fn send_report(&self, text: &str, silent: bool) -> Result<(), DeliveryError> {
        let Some(chat_id) = self.report_chat_id.as_deref() else {
            info!(report = %text, "Report (no report chat configured)");
            return Ok(());
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode: "HTML",
                disable_notification: silent,
            })
            .send()
            .await
            .map_err(without_url)?;

        Self::check_reply(response).await?;

        debug!(chat_id = %chat_id, report = %text, "Report sent");

        Ok(())
    }
}

/// Escape text for HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
