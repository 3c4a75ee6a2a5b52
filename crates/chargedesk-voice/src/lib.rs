//! Vapi voice-assistant integration.
//!
//! Vapi places the phone or web call and calls back into
//! `/chat/completions` as a custom LLM. This crate manages the assistant
//! definitions on the Vapi side and starts browser calls for the chat UI.

pub mod call;
pub mod client;
pub mod error;
pub mod service;
pub mod types;

pub use call::VoiceCallService;
pub use client::{AssistantDirectory, CallLauncher, VapiClient};
pub use error::VoiceError;
pub use service::VoiceService;
pub use types::{
    AssistantResponse, CallState, CreateAssistantRequest, VapiAssistant, VoiceCallStatus, WebCall,
    WebCallRequest,
};
