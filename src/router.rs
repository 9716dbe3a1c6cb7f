use crate::config::{API_KEY_ENV, ApiKey, Config};
use crate::converters::gemini::{GeminiRequest, GeminiResponse};
use crate::error::{ProxyError, ProxyResult};
use crate::llm_client::LlmClient;
use crate::models::{GenerateReply, InboundRequest, OutboundResponse, PromptRequest};
use crate::request_id::{RequestId, inject_request_id};
use axum::{
    Extension, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

pub const PROXY_PATH: &str = "/gemini-proxy";

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm_client: Arc<LlmClient>,
}

impl AppState {
    pub fn new(config: Config, http_client: Arc<reqwest::Client>) -> Self {
        let llm_client = Arc::new(LlmClient::new(http_client, &config));
        Self {
            config: Arc::new(config),
            llm_client,
        }
    }
}

pub fn app(app_state: AppState) -> Router {
    Router::new()
        // Every method reaches the handler so non-POST gets its 405 body
        .route(PROXY_PATH, any(gemini_proxy))
        .route("/health", get(|| async { "OK" }))
        .layer(axum::middleware::from_fn(inject_request_id))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn gemini_proxy(
    State(app_state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    method: Method,
    body: Bytes,
) -> impl IntoResponse {
    let request = InboundRequest::new(method.as_str(), String::from_utf8_lossy(&body));
    handle(
        request,
        app_state.config.api_key.as_ref(),
        &app_state.llm_client,
        Some(&request_id),
    )
    .await
}

/// Translates one inbound request into one upstream call and back.
/// Every failure is mapped to a status code and JSON body; nothing is retried.
pub async fn handle(
    request: InboundRequest,
    api_key: Option<&ApiKey>,
    llm_client: &LlmClient,
    request_id: Option<&RequestId>,
) -> OutboundResponse {
    if request.http_method != Method::POST.as_str() {
        info!("Rejecting {} request", request.http_method);
        return ProxyError::MethodNotAllowed.into();
    }

    let Some(api_key) = api_key else {
        error!("{} environment variable is not set.", API_KEY_ENV);
        return ProxyError::ConfigurationMissing.into();
    };

    match generate_text(&request.body, api_key, llm_client, request_id).await {
        Ok(reply) => OutboundResponse::json(StatusCode::OK, &reply),
        Err(err) => {
            match &err {
                ProxyError::UpstreamShape(raw) => {
                    error!("Unexpected Gemini API response structure: {}", raw)
                }
                other => error!("Error in proxy handler: {}", other),
            }
            err.into()
        }
    }
}

async fn generate_text(
    body: &str,
    api_key: &ApiKey,
    llm_client: &LlmClient,
    request_id: Option<&RequestId>,
) -> ProxyResult<GenerateReply> {
    let prompt_request = parse_prompt(body)?;
    let payload = GeminiRequest::from_prompt(prompt_request.prompt);
    let raw = llm_client.generate_content(&payload, api_key, request_id).await?;
    extract_reply(raw)
}

/// The prompt is not validated: a missing or non-string value is forwarded.
fn parse_prompt(body: &str) -> ProxyResult<PromptRequest> {
    let value: Value = serde_json::from_str(body)?;
    if value.is_null() {
        return Err(ProxyError::NullPayload);
    }
    Ok(PromptRequest {
        prompt: value.get("prompt").cloned(),
    })
}

/// Only `candidates[0].content.parts[0]` decides the outcome; the rest of the
/// upstream JSON is never validated.
fn extract_reply(raw: Value) -> ProxyResult<GenerateReply> {
    log_response_metadata(&raw);

    // A present but null `text` stays null in the reply
    let text = first_part(&raw)?.map(|part| part.get("text").cloned());
    let Some(text) = text else {
        return Err(ProxyError::UpstreamShape(raw));
    };
    Ok(GenerateReply { text })
}

/// `Ok(None)` when the candidate or part list is missing, empty or not an
/// array, or when the first candidate has no `content`.
fn first_part(raw: &Value) -> ProxyResult<Option<&Value>> {
    let Some(candidate) = raw
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    else {
        return Ok(None);
    };
    if candidate.is_null() {
        return Err(ProxyError::UpstreamNullElement("candidate"));
    }

    let Some(part) = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
    else {
        return Ok(None);
    };
    if part.is_null() {
        return Err(ProxyError::UpstreamNullElement("part"));
    }
    Ok(Some(part))
}

fn log_response_metadata(raw: &Value) {
    // Best effort; an unexpected type in these fields only skips the log line
    let Some(response) = GeminiResponse::from_raw(raw) else {
        return;
    };
    debug!(
        "response_id={:?} model_version={:?} finish_reason={:?}",
        response.response_id,
        response.model_version,
        response.candidates.first().and_then(|c| c.finish_reason.as_deref())
    );
    if let Some(usage) = &response.usage_metadata {
        debug!(
            "usage: prompt={:?} candidates={:?} total={:?}",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        );
    }
}
