use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::VoiceError;
use crate::types::{
    CreateAssistantRequest, RemoteAssistant, RemoteCall, VapiAssistant, WebCall, WebCallRequest,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where assistant definitions live.
#[async_trait]
pub trait AssistantDirectory: Send + Sync {
    async fn list_assistants(&self) -> Result<Vec<VapiAssistant>, VoiceError>;

    async fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> Result<VapiAssistant, VoiceError>;
}

/// Starts and hangs up browser calls.
#[async_trait]
pub trait CallLauncher: Send + Sync {
    async fn start_web_call(&self, request: &WebCallRequest) -> Result<WebCall, VoiceError>;

    async fn end_call(&self, call: &WebCall) -> Result<(), VoiceError>;
}

/// Minimal REST client for the Vapi API.
///
/// Assistant management needs the private key; web calls are started with
/// the public key, so each use gets its own client.
pub struct VapiClient {
    http: reqwest::Client,
    base_url: String,
}

impl VapiClient {
    pub fn new(base_url: impl Into<String>, api_key: &str) -> Result<Self, VoiceError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| VoiceError::NotConfigured(format!("invalid Vapi API key: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| VoiceError::NotConfigured(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, VoiceError> {
        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api {
                status: status.as_u16(),
                message: extract_error_message(&raw),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| VoiceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AssistantDirectory for VapiClient {
    async fn list_assistants(&self) -> Result<Vec<VapiAssistant>, VoiceError> {
        let response = self
            .http
            .get(self.url("/assistant"))
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        let body = Self::read_json(response).await?;
        let remote: Vec<RemoteAssistant> = serde_json::from_value(body)
            .map_err(|e| VoiceError::InvalidResponse(e.to_string()))?;
        debug!(count = remote.len(), "Listed Vapi assistants");
        Ok(remote.into_iter().map(VapiAssistant::from).collect())
    }

    async fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> Result<VapiAssistant, VoiceError> {
        let response = self
            .http
            .post(self.url("/assistant"))
            .json(request)
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        let body = Self::read_json(response).await?;
        let remote: RemoteAssistant = serde_json::from_value(body)
            .map_err(|e| VoiceError::InvalidResponse(e.to_string()))?;
        Ok(remote.into())
    }
}

#[async_trait]
impl CallLauncher for VapiClient {
    async fn start_web_call(&self, request: &WebCallRequest) -> Result<WebCall, VoiceError> {
        let response = self
            .http
            .post(self.url("/call/web"))
            .json(request)
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        let body = Self::read_json(response).await?;
        let remote: RemoteCall = serde_json::from_value(body)
            .map_err(|e| VoiceError::InvalidResponse(e.to_string()))?;
        let web_call_url = remote
            .web_call_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| VoiceError::InvalidResponse("web call has no webCallUrl".into()))?;
        debug!(call_id = %remote.id, "Started Vapi web call");
        Ok(WebCall {
            id: remote.id,
            web_call_url,
            control_url: remote.monitor.and_then(|m| m.control_url),
        })
    }

    async fn end_call(&self, call: &WebCall) -> Result<(), VoiceError> {
        let Some(control_url) = call.control_url.as_deref() else {
            debug!(call_id = %call.id, "No control URL, leaving call to the browser");
            return Ok(());
        };
        let response = self
            .http
            .post(control_url)
            .json(&json!({"type": "end-call"}))
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api {
                status: status.as_u16(),
                message: extract_error_message(&raw),
            });
        }
        Ok(())
    }
}

/// Vapi errors look like `{"message": "..." | [...], "error": "Unauthorized"}`.
fn extract_error_message(raw: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return raw.trim().to_string();
    };
    match value.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; "),
        _ => value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| raw.trim().to_string()),
    }
}
