use serde::{Deserialize, Serialize};
use url::Url;

use super::deserialize_string_lax;

/// Telegram channel settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// Bot token. Env: `TELEGRAM_BOT_TOKEN`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub bot_token: String,

    /// Target channel (`@name` or numeric id such as `-100123`). Env: `TELEGRAM_CHANNEL_ID`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub channel_id: String,

    /// Bot API base URL.
    /// TOML: `telegram.api_url`. Default: `https://api.telegram.org`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Longest caption the channel accepts on a photo.
    /// TOML: `telegram.caption_limit`. Default: `1024`.
    #[serde(default = "default_caption_limit")]
    pub caption_limit: usize,

    /// Optional HTTP proxy. Falls back to `providers.defaults.proxy` when unset.
    #[serde(default)]
    pub proxy: Option<Url>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            api_url: default_api_url(),
            caption_limit: default_caption_limit(),
            proxy: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.telegram.org").expect("valid Telegram API URL")
}

pub const TELEGRAM_CAPTION_LIMIT: usize = 1024;

fn default_caption_limit() -> usize {
    TELEGRAM_CAPTION_LIMIT
}
