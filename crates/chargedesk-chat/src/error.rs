//! Error types for the support agent.

use chargedesk_core::ChargeDeskError;
use chargedesk_llm::LlmError;
use chargedesk_station::StationError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("gave up after {0} tool rounds without a final answer")]
    TooManyToolRounds(usize),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("station error: {0}")]
    Station(#[from] StationError),
    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<ChatError> for ChargeDeskError {
    fn from(err: ChatError) -> Self {
        ChargeDeskError::Chat(err.to_string())
    }
}
