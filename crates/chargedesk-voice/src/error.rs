use chargedesk_core::ChargeDeskError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("voice integration not configured: {0}")]
    NotConfigured(String),

    #[error("network error talking to Vapi: {0}")]
    Network(String),

    #[error("Vapi returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid Vapi response: {0}")]
    InvalidResponse(String),

    #[error("voice call busy: {0}")]
    CallBusy(String),
}

impl From<VoiceError> for ChargeDeskError {
    fn from(err: VoiceError) -> Self {
        ChargeDeskError::Voice(err.to_string())
    }
}
