//! API error types and JSON error response formatting.
//!
//! ApiError gives every endpoint the same JSON error body and maps
//! chat, voice, and configuration failures onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use chargedesk_chat::ChatError;
use chargedesk_core::ChargeDeskError;
use chargedesk_llm::LlmError;
use chargedesk_voice::VoiceError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 404 Not Found - unknown session.
    NotFound(String),
    /// 409 Conflict - a voice call is already starting or running.
    Conflict(String),
    /// 502 Bad Gateway - an upstream service (LLM provider, Vapi) failed.
    BadGateway(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 503 Service Unavailable - component not configured.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "bad_gateway", msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::EmptyMessage | ChatError::InvalidArguments { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            ChatError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::Llm(LlmError::NoProviders) => ApiError::ServiceUnavailable(err.to_string()),
            ChatError::Llm(_) => ApiError::BadGateway(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match &err {
            VoiceError::NotConfigured(_) => ApiError::ServiceUnavailable(err.to_string()),
            VoiceError::CallBusy(_) => ApiError::Conflict(err.to_string()),
            VoiceError::Network(_) | VoiceError::Api { .. } | VoiceError::InvalidResponse(_) => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

impl From<ChargeDeskError> for ApiError {
    fn from(err: ChargeDeskError) -> Self {
        match &err {
            ChargeDeskError::Config(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
