use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::converters::gemini::{GeminiCandidate, GeminiUsage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(rename = "responseId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl GeminiResponse {
    /// `None` when any field has an unexpected type.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        serde_json::from_value(raw.clone()).ok()
    }
}
