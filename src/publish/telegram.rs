use async_trait::async_trait;
use autoposter_schema::{SendMessageRequest, TelegramMessage, TelegramResponse};
use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;

use super::Channel;
use crate::config::{ProviderDefaults, TelegramConfig};
use crate::error::{ConfigError, PublishError};
use crate::providers::http::{build_client, endpoint};
use crate::utils::logging::body_preview;

const PARSE_MODE: &str = "HTML";

/// Telegram Bot API channel.
pub struct TelegramChannel {
    client: reqwest::Client,
    chat_id: String,
    send_photo_url: Url,
    send_message_url: Url,
}

impl TelegramChannel {
    pub fn new(cfg: &TelegramConfig, defaults: &ProviderDefaults) -> Result<Self, ConfigError> {
        if cfg.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingSetting("TELEGRAM_BOT_TOKEN"));
        }
        if cfg.channel_id.trim().is_empty() {
            return Err(ConfigError::MissingSetting("TELEGRAM_CHANNEL_ID"));
        }

        let conn = defaults.connection(cfg.proxy.as_ref(), None);
        let token = cfg.bot_token.trim();
        Ok(Self {
            client: build_client(&conn)?,
            chat_id: cfg.channel_id.trim().to_string(),
            send_photo_url: endpoint(&cfg.api_url, &format!("/bot{token}/sendPhoto"))?,
            send_message_url: endpoint(&cfg.api_url, &format!("/bot{token}/sendMessage"))?,
        })
    }

    /// Every Bot API answer is `{ok, result | description}`; `ok=false` wins over the status.
    async fn read_message(resp: reqwest::Response) -> Result<i64, PublishError> {
        let status = resp.status();
        // The URL carries the bot token.
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PublishError::Transport(e.without_url()))?;

        let parsed: TelegramResponse<TelegramMessage> = match serde_json::from_slice(&bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(%status, body = %body_preview(&bytes), "Telegram unstructured response");
                return Err(PublishError::Malformed(format!(
                    "status {status}: {e}"
                )));
            }
        };

        match parsed {
            TelegramResponse {
                ok: true,
                result: Some(message),
                ..
            } => Ok(message.message_id),
            TelegramResponse {
                ok: true,
                result: None,
                ..
            } => Err(PublishError::Malformed("ok without result".to_string())),
            TelegramResponse {
                description,
                error_code,
                ..
            } => Err(PublishError::Rejected {
                status,
                code: error_code,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn send_photo(&self, image: &[u8], caption: Option<&str>) -> Result<i64, PublishError> {
        let photo = Part::bytes(image.to_vec())
            .file_name("post.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| PublishError::Transport(e.without_url()))?;

        let mut form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .part("photo", photo);
        if let Some(caption) = caption {
            form = form
                .text("caption", caption.to_string())
                .text("parse_mode", PARSE_MODE);
        }

        let resp = self
            .client
            .post(self.send_photo_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.without_url()))?;

        Self::read_message(resp).await
    }

    async fn send_text(&self, text: &str) -> Result<i64, PublishError> {
        let body = SendMessageRequest {
            chat_id: self.chat_id.clone(),
            text: text.to_string(),
            parse_mode: Some(PARSE_MODE.to_string()),
        };

        let resp = self
            .client
            .post(self.send_message_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.without_url()))?;

        Self::read_message(resp).await
    }
}
