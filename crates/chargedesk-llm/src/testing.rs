use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chargedesk_core::LlmProviderKind;

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Deterministic client that replays queued replies and records requests.
///
/// Once the script runs out every call answers with the text "ok".
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
    provider: LlmProviderKind,
    model: String,
}

impl ScriptedClient {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self::from_results(responses.into_iter().map(Ok).collect())
    }

    pub fn from_results(results: Vec<Result<LlmResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
            provider: LlmProviderKind::Openai,
            model: "scripted".to_string(),
        }
    }

    pub fn with_provider(mut self, provider: LlmProviderKind) -> Self {
        self.provider = provider;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(LlmResponse::text("ok")))
    }

    fn provider(&self) -> LlmProviderKind {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }
}
