mod claude;
mod gemini;
mod openai;
mod replicate;

pub use claude::ClaudeConfig;
pub use gemini::GeminiConfig;
pub use openai::OpenaiConfig;
pub use replicate::ReplicateConfig;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Global provider defaults (used when provider-level config is unset).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderDefaults {
    /// Optional upstream HTTP proxy. If set, used for reqwest clients.
    /// TOML: `providers.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for reqwest clients; disabled forces HTTP/1.
    /// TOML: `providers.defaults.enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,

    /// Extra attempts for upstream 5xx and transport failures. `0` disables retries.
    /// TOML: `providers.defaults.retry_max_times`. Default: `0`.
    #[serde(default)]
    pub retry_max_times: usize,

    /// TCP connect timeout in seconds.
    /// TOML: `providers.defaults.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds. Image models are slow; keep this generous.
    /// TOML: `providers.defaults.timeout_secs`. Default: `180`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            enable_multiplexing: false,
            retry_max_times: 0,
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// All provider configurations.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProvidersConfig {
    /// Global defaults for providers (overridden per provider if set).
    #[serde(default)]
    pub defaults: ProviderDefaults,

    #[serde(default)]
    pub claude: ClaudeConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub openai: OpenaiConfig,

    #[serde(default)]
    pub replicate: ReplicateConfig,
}

/// Effective transport settings for one upstream after applying defaults.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl ProviderDefaults {
    pub fn connection(&self, proxy: Option<&Url>, retry_max_times: Option<usize>) -> ConnectionConfig {
        ConnectionConfig {
            proxy: proxy.cloned().or_else(|| self.proxy.clone()),
            enable_multiplexing: self.enable_multiplexing,
            retry_max_times: retry_max_times.unwrap_or(self.retry_max_times),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    180
}
