//! Client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! OpenAI, Together, Groq, Ollama and Gemini's compatibility layer all accept
//! the same request body, so one client parameterised by base URL, model and
//! key serves every provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{debug, warn};

use chargedesk_core::config::ResolvedProvider;
use chargedesk_core::LlmProviderKind;

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::types::{LlmMessage, LlmRequest, LlmResponse, Role, ToolCall};

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    provider: ResolvedProvider,
    retry_backoff: Duration,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("provider", &self.provider.kind)
            .field("base_url", &self.provider.base_url)
            .field("model", &self.provider.model)
            .finish()
    }
}

impl OpenAiCompatibleClient {
    pub fn new(provider: ResolvedProvider) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = provider.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                LlmError::Configuration(format!(
                    "invalid {} API key header: {}",
                    provider.kind, e
                ))
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(provider.request_timeout_secs.max(1)))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            provider,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        })
    }

    /// Base delay between retries; attempt `n` waits `n * backoff`.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.provider.base_url.trim_end_matches('/')
        )
    }

    async fn send_once(&self, body: &Value) -> Result<LlmResponse, LlmError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider {
                status: status.as_u16(),
                message: extract_error_message(&raw),
            });
        }

        let raw_json = response
            .json::<Value>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        parse_chat_completion(&raw_json)
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let temperature = request.temperature.unwrap_or(self.provider.temperature);
        let body = build_request_body(&self.provider.model, request, temperature);

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(response) => {
                    debug!(
                        provider = %self.provider.kind,
                        model = %self.provider.model,
                        tool_calls = response.tool_calls.len(),
                        "Completion received"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < self.provider.max_retries => {
                    attempt += 1;
                    warn!(
                        provider = %self.provider.kind,
                        attempt,
                        error = %e,
                        "Completion failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn provider(&self) -> LlmProviderKind {
        self.provider.kind
    }

    fn model(&self) -> &str {
        &self.provider.model
    }
}

pub(crate) fn build_request_body(model: &str, request: &LlmRequest, temperature: f32) -> Value {
    let mut body = json!({
        "model": model,
        "messages": request.messages.iter().map(message_to_json).collect::<Vec<_>>(),
        "temperature": temperature,
    });

    if !request.tools.is_empty() {
        let tools: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();
        body["tools"] = Value::Array(tools);
    }

    body
}

fn message_to_json(message: &LlmMessage) -> Value {
    match message.role {
        Role::System => json!({"role": "system", "content": message.content}),
        Role::User => json!({"role": "user", "content": message.content}),
        Role::Assistant if message.tool_calls.is_empty() => {
            json!({"role": "assistant", "content": message.content})
        }
        Role::Assistant => {
            let tool_calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            let content = if message.content.is_empty() {
                Value::Null
            } else {
                Value::String(message.content.clone())
            };
            json!({"role": "assistant", "content": content, "tool_calls": tool_calls})
        }
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id.clone().unwrap_or_default(),
            "content": message.content,
        }),
    }
}

pub(crate) fn parse_chat_completion(raw: &Value) -> Result<LlmResponse, LlmError> {
    let choice = raw
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;
    let message = choice
        .get("message")
        .ok_or_else(|| LlmError::InvalidResponse("choice has no message".to_string()))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .enumerate()
                .map(|(index, call)| {
                    let function = call.get("function");
                    let arguments = function
                        .and_then(|f| f.get("arguments"))
                        .and_then(|args| match args {
                            Value::String(raw) => serde_json::from_str::<Value>(raw).ok(),
                            Value::Object(_) => Some(args.clone()),
                            _ => None,
                        })
                        .unwrap_or_else(|| json!({}));
                    ToolCall {
                        id: call
                            .get("id")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("call_{}", index)),
                        name: function
                            .and_then(|f| f.get("name"))
                            .and_then(Value::as_str)
                            .unwrap_or("unknown")
                            .to_string(),
                        arguments,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(LlmResponse {
        content,
        tool_calls,
        finish_reason: choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Pull the human-readable message out of a provider error body.
pub(crate) fn extract_error_message(raw: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(raw).ok();
    let from_json = parsed.as_ref().and_then(|value| {
        let error = value.get("error")?;
        error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .map(str::to_string)
    });

    match from_json {
        Some(message) => message,
        None if raw.trim().is_empty() => "empty response body".to_string(),
        None => raw.trim().chars().take(500).collect(),
    }
}
