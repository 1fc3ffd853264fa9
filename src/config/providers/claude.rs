use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConnectionConfig, ProviderDefaults};

/// Anthropic Messages API configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClaudeConfig {
    /// Env: `CLAUDE_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// TOML: `providers.claude.base_url`. Default: `https://api.anthropic.com`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// TOML: `providers.claude.model`. Default: `claude-sonnet-4-5-20250929`.
    #[serde(default = "default_model")]
    pub model: String,

    /// TOML: `providers.claude.max_tokens`. Default: `1500`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Falls back to `providers.defaults.proxy` when unset.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `providers.defaults.retry_max_times` when unset.
    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

impl ClaudeConfig {
    pub fn connection(&self, defaults: &ProviderDefaults) -> ConnectionConfig {
        defaults.connection(self.proxy.as_ref(), self.retry_max_times)
    }
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            proxy: None,
            retry_max_times: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.anthropic.com").expect("valid Anthropic API URL")
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_max_tokens() -> u32 {
    1500
}
