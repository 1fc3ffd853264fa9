mod content;
mod error;
mod request;
mod response;

pub use content::{Content, InlineData, Part};
pub use error::{GeminiErrorBody, GeminiErrorObject};
pub use request::{GenerateContentRequest, GenerationConfig};
pub use response::{Candidate, GenerateContentResponse};
