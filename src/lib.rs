pub mod catalog;
pub mod compose;
pub mod config;
pub mod error;
pub mod media;
pub mod orchestrator;
pub mod pipeline;
pub mod providers;
pub mod publish;
pub mod store;
pub(crate) mod utils;

pub use error::AutoposterError;
