use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConnectionConfig, ProviderDefaults};

/// OpenAI configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenaiConfig {
    /// Env: `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// TOML: `providers.openai.base_url`. Default: `https://api.openai.com`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// TOML: `providers.openai.text_model`. Default: `gpt-4o`.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// TOML: `providers.openai.max_tokens`. Default: `1500`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Plain generation without any reference image.
    /// TOML: `providers.openai.image_model`. Default: `dall-e-3`.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Generation with reference images and face swap (`images/edits`).
    /// TOML: `providers.openai.edit_model`. Default: `gpt-image-1`.
    #[serde(default = "default_edit_model")]
    pub edit_model: String,

    /// TOML: `providers.openai.image_size`. Default: `1024x1024`.
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// Falls back to `providers.defaults.proxy` when unset.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `providers.defaults.retry_max_times` when unset.
    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

impl OpenaiConfig {
    pub fn connection(&self, defaults: &ProviderDefaults) -> ConnectionConfig {
        defaults.connection(self.proxy.as_ref(), self.retry_max_times)
    }
}

impl Default for OpenaiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            text_model: default_text_model(),
            max_tokens: default_max_tokens(),
            image_model: default_image_model(),
            edit_model: default_edit_model(),
            image_size: default_image_size(),
            proxy: None,
            retry_max_times: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.openai.com").expect("valid OpenAI API URL")
}

fn default_text_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_edit_model() -> String {
    "gpt-image-1".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}
