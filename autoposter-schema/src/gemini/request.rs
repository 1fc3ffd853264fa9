use super::Content;
use serde::{Deserialize, Serialize};

/// Body of `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// `generationConfig` object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// `["IMAGE"]` asks image models for pixels only; `["TEXT", "IMAGE"]` allows both.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
}

impl GenerationConfig {
    pub fn image_only() -> Self {
        Self {
            response_modalities: vec!["IMAGE".to_string()],
            ..Default::default()
        }
    }

    pub fn text_and_image() -> Self {
        Self {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::Part;
    use serde_json::json;

    #[test]
    fn empty_generation_config_is_omitted() {
        let req = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text("hi")])],
            generation_config: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn image_only_sets_response_modalities() {
        let value = serde_json::to_value(GenerationConfig::image_only()).unwrap();
        assert_eq!(value, json!({"responseModalities": ["IMAGE"]}));
    }
}
