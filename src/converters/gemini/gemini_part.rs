use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single content part. Only text parts are produced; non-text parts coming
/// back from the API deserialize with `text: None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeminiPart {
    // Raw JSON so a non-string prompt is forwarded untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl GeminiPart {
    pub fn text(text: Option<Value>) -> Self {
        Self { text, thought: None }
    }
}
