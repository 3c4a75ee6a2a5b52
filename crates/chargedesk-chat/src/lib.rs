//! Conversational support agent for ChargeDesk.
//!
//! Holds the in-memory session store, the tools the model can call, the
//! system prompt, the tool-calling loop, and the per-session agent map.

pub mod agent;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod tools;

pub use agent::{AgentEvent, ChatbotAgent};
pub use error::ChatError;
pub use orchestrator::{ChatOrchestrator, OrchestratorSettings, SessionInfo};
pub use session::{ChatService, ChatSessionSummary};
pub use tools::{ChatTool, ToolContext, ToolRegistry};
