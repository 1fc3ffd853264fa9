use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::{FaceStrategy, ProviderName, Role, face_strategy};
use crate::error::ConfigError;

pub const SELECTION_KEYS: [&str; 4] = [
    "TEXT_PROVIDER",
    "IMAGE_PROVIDER",
    "FACE_SWAP_PROVIDER",
    "AUTOPUBLISH_ENABLED",
];

/// Which vendor does which job, read from `provider.cfg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSelection {
    pub text: ProviderName,
    pub image: ProviderName,
    /// `None` disables the face step entirely.
    pub face_swap: Option<ProviderName>,
    pub autopublish_enabled: bool,
}

impl Default for ProviderSelection {
    fn default() -> Self {
        Self {
            text: ProviderName::Claude,
            image: ProviderName::Gemini,
            face_swap: None,
            autopublish_enabled: true,
        }
    }
}

impl ProviderSelection {
    /// Reads `KEY=VALUE` lines from `path` (if it exists); variables of the same name in the
    /// process environment override the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut pairs = Vec::new();
        if path.is_file() {
            let selection_err = |source| ConfigError::Selection {
                path: path.to_path_buf(),
                source,
            };
            for item in dotenvy::from_path_iter(path).map_err(selection_err)? {
                pairs.push(item.map_err(selection_err)?);
            }
        }
        for key in SELECTION_KEYS {
            if let Ok(value) = std::env::var(key) {
                pairs.push((key.to_string(), value));
            }
        }
        Self::from_pairs(pairs)
    }

    /// Later pairs win. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut selection = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref().trim().to_ascii_uppercase().as_str() {
                "TEXT_PROVIDER" => {
                    if let Some(p) = parse_provider(Role::Text, value)? {
                        selection.text = p;
                    }
                }
                "IMAGE_PROVIDER" => {
                    if let Some(p) = parse_provider(Role::Image, value)? {
                        selection.image = p;
                    }
                }
                "FACE_SWAP_PROVIDER" => {
                    selection.face_swap = parse_provider(Role::FaceSwap, value)?;
                }
                "AUTOPUBLISH_ENABLED" => {
                    selection.autopublish_enabled = parse_flag("AUTOPUBLISH_ENABLED", value)?;
                }
                _ => {}
            }
        }
        Ok(selection)
    }

    pub fn face_strategy(&self) -> FaceStrategy {
        face_strategy(self.image, self.face_swap)
    }
}

/// Empty means "not set". A name outside the registry, or one that cannot play `role`, is an error.
fn parse_provider(role: Role, value: &str) -> Result<Option<ProviderName>, ConfigError> {
    if value.is_empty() {
        return Ok(None);
    }
    let provider: ProviderName = value.parse().map_err(|()| ConfigError::UnknownProvider {
        role,
        value: value.to_string(),
        allowed: ProviderName::names_for(role),
    })?;
    if !provider.supports(role) {
        return Err(ConfigError::UnsupportedRole { provider, role });
    }
    Ok(Some(provider))
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_defaults() {
        let selection = ProviderSelection::from_pairs(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(selection, ProviderSelection::default());
        assert_eq!(selection.face_strategy(), FaceStrategy::Plain);
    }

    #[test]
    fn parses_all_keys_case_insensitively() {
        let selection = ProviderSelection::from_pairs([
            ("TEXT_PROVIDER", "OpenAI"),
            ("IMAGE_PROVIDER", "openai"),
            ("FACE_SWAP_PROVIDER", "Replicate"),
            ("AUTOPUBLISH_ENABLED", "false"),
        ])
        .unwrap();

        assert_eq!(selection.text, ProviderName::Openai);
        assert_eq!(selection.image, ProviderName::Openai);
        assert_eq!(selection.face_swap, Some(ProviderName::Replicate));
        assert!(!selection.autopublish_enabled);
        assert_eq!(
            selection.face_strategy(),
            FaceStrategy::TwoCall(ProviderName::Replicate)
        );
    }

    #[test]
    fn empty_face_swap_clears_an_earlier_value() {
        let selection = ProviderSelection::from_pairs([
            ("FACE_SWAP_PROVIDER", "gemini"),
            ("FACE_SWAP_PROVIDER", ""),
        ])
        .unwrap();
        assert_eq!(selection.face_swap, None);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = ProviderSelection::from_pairs([("IMAGE_PROVIDER", "midjourney")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownProvider { role: Role::Image, .. }
        ));
        assert!(err.to_string().contains("gemini, openai"));
    }

    #[test]
    fn provider_in_wrong_role_is_rejected() {
        let err = ProviderSelection::from_pairs([("IMAGE_PROVIDER", "claude")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedRole {
                provider: ProviderName::Claude,
                role: Role::Image
            }
        ));
    }

    #[test]
    fn flag_accepts_boolean_like_strings() {
        for (raw, expected) in [("1", true), ("YES", true), ("on", true), ("0", false), ("off", false)] {
            let selection =
                ProviderSelection::from_pairs([("AUTOPUBLISH_ENABLED", raw)]).unwrap();
            assert_eq!(selection.autopublish_enabled, expected, "value {raw}");
        }
        assert!(ProviderSelection::from_pairs([("AUTOPUBLISH_ENABLED", "maybe")]).is_err());
    }
}
