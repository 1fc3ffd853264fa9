mod config;
mod pipeline;
mod provider;
mod store;

pub use config::ConfigError;
pub use pipeline::{AutoposterError, GenerateError, PublishError};
pub use provider::ProviderError;
pub use store::StoreError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
