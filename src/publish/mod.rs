//! Delivering a draft to the channel.

mod telegram;

pub use telegram::TelegramChannel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PublishError;

/// A destination that accepts a photo (optionally captioned) and plain text messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Returns the id of the sent message.
    async fn send_photo(&self, image: &[u8], caption: Option<&str>) -> Result<i64, PublishError>;

    async fn send_text(&self, text: &str) -> Result<i64, PublishError>;
}

/// Ids of every message a publish produced, in send order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub message_ids: Vec<i64>,
}

pub struct Publisher<C> {
    channel: C,
    caption_limit: usize,
}

impl<C: Channel> Publisher<C> {
    pub fn new(channel: C, caption_limit: usize) -> Self {
        Self {
            channel,
            caption_limit,
        }
    }

    /// One captioned photo when the text fits, otherwise the bare photo followed by the text.
    ///
    /// The text is never altered. A failure midway is not rolled back.
    pub async fn publish(&self, image: &[u8], text: &str) -> Result<PublishReceipt, PublishError> {
        let chars = text.chars().count();

        let message_ids = if chars <= self.caption_limit {
            let caption = Some(text).filter(|t| !t.is_empty());
            vec![self.channel.send_photo(image, caption).await?]
        } else {
            info!(
                chars,
                limit = self.caption_limit,
                "Text exceeds caption limit, sending photo and text separately"
            );
            let photo = self.channel.send_photo(image, None).await?;
            let message = self.channel.send_text(text).await?;
            vec![photo, message]
        };

        info!(message_ids = ?message_ids, "Post published");
        Ok(PublishReceipt { message_ids })
    }
}
