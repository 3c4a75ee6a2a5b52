use chargedesk_core::ChargeDeskError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no LLM providers are configured")]
    NoProviders,

    #[error("invalid LLM configuration: {0}")]
    Configuration(String),

    #[error("network error talking to LLM provider: {0}")]
    Network(String),

    #[error("provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Transient failures worth another attempt: transport errors,
    /// rate limiting and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) => true,
            LlmError::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<LlmError> for ChargeDeskError {
    fn from(err: LlmError) -> Self {
        ChargeDeskError::Llm(err.to_string())
    }
}
