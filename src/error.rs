use crate::models::{ErrorBody, OutboundResponse};
use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
pub const INVALID_UPSTREAM_RESPONSE: &str = "Failed to get valid response from Gemini API";

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Server configuration error: API key missing.")]
    ConfigurationMissing,

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("request body is null, expected an object with a prompt")]
    NullPayload,

    // reqwest errors passed in here have had their URL stripped, so the
    // query-string credential never reaches a client.
    #[error("{0}")]
    Network(reqwest::Error),

    #[error("{0}")]
    UpstreamBody(reqwest::Error),

    #[error("upstream response body is null")]
    UpstreamNull,

    // A null first candidate or first part; other wrong types are a shape mismatch
    #[error("upstream {0} is null")]
    UpstreamNullElement(&'static str),

    #[error("Failed to get valid response from Gemini API")]
    UpstreamShape(Value),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        match self {
            ProxyError::MethodNotAllowed | ProxyError::ConfigurationMissing => ErrorBody {
                error: self.to_string(),
                details: None,
            },
            ProxyError::UpstreamShape(result) => ErrorBody {
                error: INVALID_UPSTREAM_RESPONSE.to_string(),
                details: Some(result.clone()),
            },
            ProxyError::Parse(_)
            | ProxyError::NullPayload
            | ProxyError::Network(_)
            | ProxyError::UpstreamBody(_)
            | ProxyError::UpstreamNull
            | ProxyError::UpstreamNullElement(_) => ErrorBody {
                error: INTERNAL_SERVER_ERROR.to_string(),
                details: Some(Value::String(self.to_string())),
            },
        }
    }
}

impl From<ProxyError> for OutboundResponse {
    fn from(err: ProxyError) -> Self {
        OutboundResponse::json(err.status_code(), &err.to_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_of(err: ProxyError) -> (StatusCode, Value) {
        let resp: OutboundResponse = err.into();
        (resp.status_code, serde_json::from_str(&resp.body).unwrap())
    }

    #[test]
    fn test_method_not_allowed_body() {
        let (status, body) = body_of(ProxyError::MethodNotAllowed);
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Method Not Allowed" }));
    }

    #[test]
    fn test_configuration_missing_body() {
        let (status, body) = body_of(ProxyError::ConfigurationMissing);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Server configuration error: API key missing." }));
    }

    #[test]
    fn test_parse_error_carries_message() {
        let err = serde_json::from_str::<Value>("{not json").unwrap_err();
        let message = err.to_string();
        let (status, body) = body_of(ProxyError::Parse(err));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["details"], message);
    }

    #[test]
    fn test_upstream_shape_carries_raw_result() {
        let raw = json!({ "candidates": [], "promptFeedback": { "blockReason": "SAFETY" } });
        let (status, body) = body_of(ProxyError::UpstreamShape(raw.clone()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to get valid response from Gemini API");
        assert_eq!(body["details"], raw);
    }
}
