//! Chat-completion clients for the support agent.
//!
//! Every supported provider speaks the OpenAI chat-completions dialect, so a
//! single HTTP client covers them all; [`LlmRegistry`] picks one per session.

pub mod client;
pub mod error;
pub mod openai;
pub mod registry;
pub mod testing;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAiCompatibleClient;
pub use registry::LlmRegistry;
pub use testing::ScriptedClient;
pub use types::{LlmMessage, LlmRequest, LlmResponse, Role, ToolCall, ToolDefinition};
