use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub http_method: String,
    pub body: String,
}

impl InboundRequest {
    pub fn new(http_method: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            body: body.into(),
        }
    }
}

/// Client payload. `prompt` is kept as raw JSON and forwarded unvalidated;
/// `None` means the key was absent, `Some(Value::Null)` an explicit null.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub prompt: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReply {
    // Omitted when the first upstream part had no text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status_code: StatusCode,
    pub body: String,
}

impl OutboundResponse {
    pub fn json<T: Serialize>(status_code: StatusCode, payload: &T) -> Self {
        // Only plain structs and serde_json::Value are serialized here
        let body = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
        Self { status_code, body }
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        (
            self.status_code,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}
