use crate::config::{ApiKey, Config};
use crate::converters::gemini::GeminiRequest;
use crate::error::{ProxyError, ProxyResult};
use crate::request_id::RequestId;
use reqwest::header::HeaderValue;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct LlmClient {
    http_client: Arc<reqwest::Client>,
    api_base: String,
    model: String,
}

impl LlmClient {
    pub fn new(http_client: Arc<reqwest::Client>, config: &Config) -> Self {
        Self {
            http_client,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
        }
    }

    /// Target URL without the credential; the key is attached as a query
    /// parameter at send time so it never ends up in logs.
    fn build_target_url(&self) -> String {
        let path = format!("models/{}:generateContent", self.model);
        if self.api_base.ends_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        }
    }

    /// One `generateContent` round trip. Returns the upstream JSON untouched;
    /// the HTTP status is not inspected, error objects come back as JSON too.
    pub async fn generate_content(
        &self,
        request: &GeminiRequest,
        api_key: &ApiKey,
        request_id: Option<&RequestId>,
    ) -> ProxyResult<Value> {
        let target_url = self.build_target_url();

        let mut target_request = self
            .http_client
            .post(&target_url)
            .query(&[("key", api_key.expose())])
            .header("Content-Type", "application/json");

        if let Some(request_id) = request_id {
            if let Ok(val) = HeaderValue::from_str(&request_id.0) {
                target_request = target_request.header("x-request-id", val);
            }
        }

        info!("Forwarding request to: {}?key=***", target_url);
        debug!(
            "request body: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        // without_url(): the URL carries the credential
        let response = target_request
            .json(request)
            .send()
            .await
            .map_err(|e| ProxyError::Network(e.without_url()))?;
        debug!("upstream status: {}", response.status());

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ProxyError::UpstreamBody(e.without_url()))?;
        if raw.is_null() {
            return Err(ProxyError::UpstreamNull);
        }
        Ok(raw)
    }
}
