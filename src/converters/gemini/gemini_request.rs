use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::converters::gemini::{GeminiContent, GeminiPart};

/// Body of a `generateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    /// Wraps the prompt as a single user turn. No other transformation is applied.
    pub fn from_prompt(prompt: Option<Value>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(prompt)],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_prompt_shape() {
        let req = GeminiRequest::from_prompt(Some(json!("hello")));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "contents": [ { "role": "user", "parts": [ { "text": "hello" } ] } ] })
        );
    }

    #[test]
    fn test_missing_prompt_omits_text() {
        let req = GeminiRequest::from_prompt(None);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "contents": [ { "role": "user", "parts": [ {} ] } ] })
        );
    }

    #[test]
    fn test_non_string_prompt_is_forwarded_as_is() {
        let req = GeminiRequest::from_prompt(Some(json!({ "nested": [1, 2] })));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], json!({ "nested": [1, 2] }));
    }
}
