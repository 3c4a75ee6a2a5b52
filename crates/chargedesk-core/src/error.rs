use thiserror::Error;

/// Top-level error type for ChargeDesk.
///
/// Subsystem crates define their own error enums and convert into this one
/// at the composition root, so `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChargeDeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Station error: {0}")]
    Station(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ChargeDeskError {
    fn from(err: toml::de::Error) -> Self {
        ChargeDeskError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ChargeDeskError {
    fn from(err: toml::ser::Error) -> Self {
        ChargeDeskError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ChargeDeskError {
    fn from(err: serde_json::Error) -> Self {
        ChargeDeskError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for ChargeDesk operations.
pub type Result<T> = std::result::Result<T, ChargeDeskError>;
