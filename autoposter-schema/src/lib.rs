//! Wire types for the upstream APIs the autoposter talks to.
//!
//! Only the fields the pipeline reads or writes are modeled; everything else is kept in
//! `extra` maps so responses survive upstream additions.

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod replicate;
pub mod telegram;

pub use anthropic::{AnthropicErrorBody, AnthropicMessage, MessagesRequest, MessagesResponse};
pub use gemini::{
    Candidate, Content, GeminiErrorBody, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, InlineData, Part,
};
pub use openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageData, ImageGenerationRequest,
    ImagesResponse, OpenaiErrorBody,
};
pub use replicate::{Prediction, PredictionRequest, PredictionStatus, ReplicateErrorBody};
pub use telegram::{SendMessageRequest, TelegramMessage, TelegramResponse};
