use async_trait::async_trait;
use chargedesk_core::LlmProviderKind;

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one non-streaming completion.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    fn provider(&self) -> LlmProviderKind;

    fn model(&self) -> &str;
}
