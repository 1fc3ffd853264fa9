//! Prompt assembly for the text step and parsing of the model's answer.

use crate::store::{ContextDocument, PromptOverrides};

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an expert in natural facial rejuvenation. You run a Telegram channel and write \
engaging, useful posts for women aged 30-55.

Rules:
- Use Telegram HTML markup: <b>bold</b>, <i>italic</i>
- Post length: 500-1000 characters (no more, this is Telegram)
- Structure: catchy headline, useful content, call to action
- Add 3-5 relevant hashtags at the end
- Do not use Markdown, only HTML tags
- Separate paragraphs with an empty line
- Tone: friendly, expert, no filler

The answer must use this format:
POST:
<post text with HTML markup>

IMAGE_PROMPT:
<an English prompt for an image that goes with this post, describing a beautiful, aesthetic \
picture related to the topic, no text in the picture, professional photography style>";

pub const DEFAULT_IMAGE_PROMPT_TEMPLATE: &str = "Beautiful aesthetic photo related to facial \
rejuvenation and {idea}, professional photography, soft lighting, skincare";

const IDEA_PLACEHOLDER: &str = "{idea}";
const POST_MARKER: &str = "POST:";
const IMAGE_PROMPT_MARKER: &str = "IMAGE_PROMPT:";

/// Everything the text provider is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    pub system: String,
    pub user: String,
}

/// Post body and the prompt for its picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPost {
    pub text: String,
    pub image_prompt: String,
}

pub fn user_message(idea: &str) -> String {
    format!("Write a post on the topic: {idea}")
}

/// Override (or default) system prompt with the context document appended.
pub fn system_prompt(overrides: &PromptOverrides, context: Option<&ContextDocument>) -> String {
    let mut prompt = overrides
        .system_prompt
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT)
        .to_string();

    if let Some(doc) = context.filter(|doc| !doc.text.trim().is_empty()) {
        prompt.push_str("\n\n--- CONTEXT DOCUMENT ---\n");
        prompt.push_str(&doc.text);
        prompt.push_str(
            "\n--- END OF DOCUMENT ---\n\n\
             Use the information from the document above as the source of facts and context \
             when writing the post. Rely on its facts and style.",
        );
    }
    prompt
}

pub fn text_prompt(
    idea: &str,
    overrides: &PromptOverrides,
    context: Option<&ContextDocument>,
) -> TextPrompt {
    TextPrompt {
        system: system_prompt(overrides, context),
        user: user_message(idea),
    }
}

pub fn image_prompt_from_template(idea: &str, overrides: &PromptOverrides) -> String {
    overrides
        .image_prompt_template
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_IMAGE_PROMPT_TEMPLATE)
        .replace(IDEA_PLACEHOLDER, idea)
}

/// Splits `POST: … IMAGE_PROMPT: …`. Without both markers the whole answer is the post and
/// the image prompt comes from the template.
pub fn parse_response(response: &str, idea: &str, overrides: &PromptOverrides) -> ComposedPost {
    if response.contains(POST_MARKER)
        && let Some((post, image_prompt)) = response.split_once(IMAGE_PROMPT_MARKER)
    {
        return ComposedPost {
            text: post.replace(POST_MARKER, "").trim().to_string(),
            image_prompt: image_prompt.trim().to_string(),
        };
    }

    ComposedPost {
        text: response.trim().to_string(),
        image_prompt: image_prompt_from_template(idea, overrides),
    }
}
