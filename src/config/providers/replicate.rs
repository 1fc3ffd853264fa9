use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConnectionConfig, ProviderDefaults};

/// Replicate face-swap configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplicateConfig {
    /// Env: `REPLICATE_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// TOML: `providers.replicate.base_url`. Default: `https://api.replicate.com`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Version hash of the face-swap model.
    /// TOML: `providers.replicate.model_version`.
    #[serde(default = "default_model_version")]
    pub model_version: String,

    /// Seconds between polls of a running prediction.
    /// TOML: `providers.replicate.poll_interval_secs`. Default: `2`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Give up on a prediction after this many seconds.
    /// TOML: `providers.replicate.max_wait_secs`. Default: `120`.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,

    /// Falls back to `providers.defaults.proxy` when unset.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `providers.defaults.retry_max_times` when unset.
    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

impl ReplicateConfig {
    pub fn connection(&self, defaults: &ProviderDefaults) -> ConnectionConfig {
        defaults.connection(self.proxy.as_ref(), self.retry_max_times)
    }
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model_version: default_model_version(),
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
            proxy: None,
            retry_max_times: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.replicate.com").expect("valid Replicate API URL")
}

/// `xiankgx/face-swap`.
fn default_model_version() -> String {
    "cff87316e31787df12002c9b4bff286f20cee315b38c4743bef89d8113e3d986".to_string()
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_wait_secs() -> u64 {
    120
}
