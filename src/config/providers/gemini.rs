use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConnectionConfig, ProviderDefaults};

/// Gemini (Generative Language API) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Env: `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// TOML: `providers.gemini.base_url`. Default: `https://generativelanguage.googleapis.com`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Model used for post text.
    /// TOML: `providers.gemini.text_model`. Default: `gemini-2.5-flash`.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for image generation, with or without a reference face.
    /// TOML: `providers.gemini.image_model`. Default: `gemini-2.5-flash-image`.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Falls back to `providers.defaults.proxy` when unset.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `providers.defaults.retry_max_times` when unset.
    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

impl GeminiConfig {
    pub fn connection(&self, defaults: &ProviderDefaults) -> ConnectionConfig {
        defaults.connection(self.proxy.as_ref(), self.retry_max_times)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            proxy: None,
            retry_max_times: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://generativelanguage.googleapis.com").expect("valid Gemini API URL")
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}
