mod basic;
mod providers;
mod selection;
mod telegram;

pub use basic::BasicConfig;
pub use providers::{
    ClaudeConfig, ConnectionConfig, GeminiConfig, OpenaiConfig, ProviderDefaults,
    ProvidersConfig, ReplicateConfig,
};
pub use selection::{ProviderSelection, SELECTION_KEYS};
pub use telegram::{TELEGRAM_CAPTION_LIMIT, TelegramConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application configuration managed by Figment.
///
/// Passed explicitly to whatever needs it; there is no global instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core settings (see `basic` table in autoposter.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Vendor endpoints, credentials and transport settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Publication channel.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "autoposter.toml";

/// Well-known secret variables and the config key each one fills.
const SECRET_ENV_KEYS: &[(&str, &str)] = &[
    ("CLAUDE_API_KEY", "providers.claude.api_key"),
    ("GEMINI_API_KEY", "providers.gemini.api_key"),
    ("OPENAI_API_KEY", "providers.openai.api_key"),
    ("REPLICATE_API_KEY", "providers.replicate.api_key"),
    ("TELEGRAM_BOT_TOKEN", "telegram.bot_token"),
    ("TELEGRAM_CHANNEL_ID", "telegram.channel_id"),
];

impl Config {
    /// Defaults, then the TOML file when present, then `AUTOPOSTER_*` variables
    /// (`__` separates nesting levels), then the well-known secret variables.
    pub fn figment(config_file: &Path) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if config_file.is_file() {
            figment.merge(Toml::file(config_file))
        } else {
            figment
        };
        figment
            .merge(Env::prefixed("AUTOPOSTER_").split("__"))
            .merge(secret_env())
    }

    /// Loads configuration. An explicitly named file must exist; the default one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        let cfg: Self = Self::figment(&path).extract()?;
        if cfg.telegram.caption_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "telegram.caption_limit",
                value: "0".to_string(),
            });
        }
        Ok(cfg)
    }
}

fn secret_env() -> Env {
    let names: Vec<&str> = SECRET_ENV_KEYS.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        SECRET_ENV_KEYS
            .iter()
            .find(|(env, _)| key.as_str().eq_ignore_ascii_case(env))
            .map_or_else(|| key.as_str().to_owned(), |(_, path)| (*path).to_owned())
            .into()
    })
}

/// Accepts numbers where a string is expected; env values such as `-100123` arrive typed.
pub(crate) fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("expected a string or a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_any_source() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load(None).map_err(|e| e.to_string())?;
            assert_eq!(cfg.basic.data_dir, PathBuf::from("data"));
            assert_eq!(cfg.telegram.caption_limit, TELEGRAM_CAPTION_LIMIT);
            assert_eq!(cfg.providers.gemini.image_model, "gemini-2.5-flash-image");
            assert_eq!(cfg.providers.defaults.retry_max_times, 0);
            Ok(())
        });
    }

    #[test]
    fn toml_then_prefixed_env_then_secrets() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [basic]
                data_dir = "store"
                loglevel = "debug"

                [providers.openai]
                text_model = "gpt-4o-mini"
                "#,
            )?;
            jail.set_env("AUTOPOSTER_BASIC__LOGLEVEL", "warn");
            jail.set_env("OPENAI_API_KEY", "sk-test");
            jail.set_env("TELEGRAM_CHANNEL_ID", "-100123");

            let cfg = Config::load(None).map_err(|e| e.to_string())?;
            assert_eq!(cfg.basic.data_dir, PathBuf::from("store"));
            assert_eq!(cfg.basic.loglevel, "warn");
            assert_eq!(cfg.providers.openai.text_model, "gpt-4o-mini");
            assert_eq!(cfg.providers.openai.api_key, "sk-test");
            assert_eq!(cfg.telegram.channel_id, "-100123");
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = Config::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::ConfigFileNotFound(_)));
            Ok(())
        });
    }
}
