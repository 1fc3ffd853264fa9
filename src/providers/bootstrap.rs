use std::sync::Arc;
use tracing::info;

use super::claude::ClaudeClient;
use super::gemini::GeminiClient;
use super::openai::OpenaiClient;
use super::replicate::ReplicateClient;
use super::{FaceSwapper, ImageGenerator, TextGenerator};
use crate::catalog::{FaceStrategy, ProviderName, Role};
use crate::config::{Config, ProviderSelection};
use crate::error::ConfigError;

/// The clients a run needs, one per role.
///
/// Only the providers the selection names are built, so a missing key for an unused vendor is
/// never an error.
#[derive(Clone)]
pub struct Providers {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    /// Present only for the two-call face path.
    pub face_swap: Option<Arc<dyn FaceSwapper>>,
}

impl Providers {
    pub fn build(cfg: &Config, selection: &ProviderSelection) -> Result<Self, ConfigError> {
        let defaults = &cfg.providers.defaults;

        info!(
            providers_defaults_proxy = %defaults.proxy.as_ref().map_or("<none>", |u| u.as_str()),
            providers_defaults_enable_multiplexing = defaults.enable_multiplexing,
            providers_defaults_retry_max_times = defaults.retry_max_times,
            providers_defaults_timeout_secs = defaults.timeout_secs,
            "Provider defaults loaded"
        );
        info!(
            text = %selection.text,
            image = %selection.image,
            face_swap = %selection.face_swap.map_or("<none>", ProviderName::as_str),
            face_strategy = ?selection.face_strategy(),
            autopublish = selection.autopublish_enabled,
            "Provider selection (effective)"
        );

        let face_swap = match selection.face_strategy() {
            FaceStrategy::TwoCall(provider) => Some(face_swapper(cfg, provider)?),
            FaceStrategy::Plain | FaceStrategy::Inline => None,
        };

        Ok(Self {
            text: text_generator(cfg, selection.text)?,
            image: image_generator(cfg, selection.image)?,
            face_swap,
        })
    }
}

fn require_key(provider: ProviderName, api_key: &str) -> Result<(), ConfigError> {
    if api_key.trim().is_empty() {
        return Err(ConfigError::MissingCredential {
            provider,
            key: credential_env_key(provider),
        });
    }
    Ok(())
}

/// Environment variable an operator sets to supply `provider`'s key.
pub(crate) const fn credential_env_key(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::Claude => "CLAUDE_API_KEY",
        ProviderName::Gemini => "GEMINI_API_KEY",
        ProviderName::Openai => "OPENAI_API_KEY",
        ProviderName::Replicate => "REPLICATE_API_KEY",
    }
}

fn unsupported(provider: ProviderName, role: Role) -> ConfigError {
    ConfigError::UnsupportedRole { provider, role }
}

fn text_generator(
    cfg: &Config,
    provider: ProviderName,
) -> Result<Arc<dyn TextGenerator>, ConfigError> {
    let p = &cfg.providers;
    Ok(match provider {
        ProviderName::Claude => {
            require_key(provider, &p.claude.api_key)?;
            info!(model = %p.claude.model, base_url = %p.claude.base_url, "Claude text client");
            Arc::new(ClaudeClient::new(&p.claude, &p.defaults)?)
        }
        ProviderName::Gemini => {
            require_key(provider, &p.gemini.api_key)?;
            info!(model = %p.gemini.text_model, base_url = %p.gemini.base_url, "Gemini text client");
            Arc::new(GeminiClient::new(&p.gemini, &p.defaults)?)
        }
        ProviderName::Openai => {
            require_key(provider, &p.openai.api_key)?;
            info!(model = %p.openai.text_model, base_url = %p.openai.base_url, "OpenAI text client");
            Arc::new(OpenaiClient::new(&p.openai, &p.defaults)?)
        }
        ProviderName::Replicate => return Err(unsupported(provider, Role::Text)),
    })
}

fn image_generator(
    cfg: &Config,
    provider: ProviderName,
) -> Result<Arc<dyn ImageGenerator>, ConfigError> {
    let p = &cfg.providers;
    Ok(match provider {
        ProviderName::Gemini => {
            require_key(provider, &p.gemini.api_key)?;
            info!(model = %p.gemini.image_model, "Gemini image client");
            Arc::new(GeminiClient::new(&p.gemini, &p.defaults)?)
        }
        ProviderName::Openai => {
            require_key(provider, &p.openai.api_key)?;
            info!(
                model = %p.openai.image_model,
                edit_model = %p.openai.edit_model,
                size = %p.openai.image_size,
                "OpenAI image client"
            );
            Arc::new(OpenaiClient::new(&p.openai, &p.defaults)?)
        }
        ProviderName::Claude | ProviderName::Replicate => {
            return Err(unsupported(provider, Role::Image));
        }
    })
}

fn face_swapper(
    cfg: &Config,
    provider: ProviderName,
) -> Result<Arc<dyn FaceSwapper>, ConfigError> {
    let p = &cfg.providers;
    Ok(match provider {
        ProviderName::Replicate => {
            require_key(provider, &p.replicate.api_key)?;
            info!(
                version = %p.replicate.model_version,
                poll_interval_secs = p.replicate.poll_interval_secs,
                max_wait_secs = p.replicate.max_wait_secs,
                "Replicate face-swap client"
            );
            Arc::new(ReplicateClient::new(&p.replicate, &p.defaults)?)
        }
        // Reference-capable providers embed the face in the image call and
        // never reach the two-call path.
        ProviderName::Claude | ProviderName::Gemini | ProviderName::Openai => {
            return Err(unsupported(provider, Role::FaceSwap));
        }
    })
}
