use std::path::PathBuf;
use thiserror::Error as ThisError;

use crate::catalog::{ProviderName, Role};

/// Fatal problems detected before any upstream call is made.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("Unknown {role} provider: '{value}'. Use one of: {allowed}")]
    UnknownProvider {
        role: Role,
        value: String,
        allowed: String,
    },

    #[error("Provider '{provider}' cannot act as the {role} provider")]
    UnsupportedRole { provider: ProviderName, role: Role },

    #[error("{key} is not set (required by provider '{provider}')")]
    MissingCredential {
        provider: ProviderName,
        key: &'static str,
    },

    #[error("{0} is not set")]
    MissingSetting(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Selection {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Failed to extract configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}
