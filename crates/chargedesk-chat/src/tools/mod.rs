//! Tools the support agent can call, and the registry that dispatches them.
//!
//! Tool names and descriptions are part of the prompt contract: the system
//! prompt refers to tools by name, and the model picks them from the
//! descriptions.

pub mod instructions;
pub mod interim;
pub mod station;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use chargedesk_core::config::SessionConfig;
use chargedesk_llm::{ToolCall, ToolDefinition};
use chargedesk_station::StationBackend;

use crate::agent::AgentEvent;
use crate::error::ChatError;
use crate::session::ChatService;

pub use instructions::StationInstructionsTool;
pub use interim::InterimMessageTool;
pub use station::{CheckStationStatusTool, RebootStationTool};

/// Per-call context handed to tools.
#[derive(Clone)]
pub struct ToolContext {
    pub session_id: String,
    events: UnboundedSender<AgentEvent>,
}

impl ToolContext {
    pub fn new(session_id: impl Into<String>, events: UnboundedSender<AgentEvent>) -> Self {
        Self {
            session_id: session_id.into(),
            events,
        }
    }

    /// Push an interim message to the client right away, ahead of the
    /// model's next reply. A disconnected client is not an error.
    pub fn send_intermediate(&self, message: &str) {
        if self
            .events
            .send(AgentEvent::Intermediate(message.to_string()))
            .is_err()
        {
            warn!(session_id = %self.session_id, "Client gone, interim message dropped");
        }
    }
}

#[async_trait]
pub trait ChatTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn definition(&self) -> ToolDefinition;

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ChatError>;
}

/// Deserialize tool arguments, naming the tool on failure.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ChatError> {
    serde_json::from_value(args).map_err(|e| ChatError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// JSON schema for tools that take no arguments.
pub(crate) fn no_parameters() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ChatTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five station-support tools, in the order the model sees them.
    pub fn support_tools(
        backend: Arc<dyn StationBackend>,
        sessions: Arc<ChatService>,
        session_config: &SessionConfig,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(InterimMessageTool::checking()));
        registry.register(Arc::new(InterimMessageTool::rebooting()));
        registry.register(Arc::new(StationInstructionsTool));
        registry.register(Arc::new(CheckStationStatusTool::new(Arc::clone(&backend))));
        registry.register(Arc::new(RebootStationTool::new(
            backend,
            sessions,
            session_config.reboot_limit,
            session_config.reboot_window_secs,
        )));
        registry
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn ChatTool>) {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Run one tool call. Failures come back as `{"error": "..."}` so the
    /// model can recover instead of the turn aborting.
    pub async fn execute(&self, ctx: &ToolContext, call: &ToolCall) -> Value {
        let Some(tool) = self.tools.iter().find(|tool| tool.name() == call.name) else {
            warn!(session_id = %ctx.session_id, tool = %call.name, "Model called unknown tool");
            return json!({"error": ChatError::UnknownTool(call.name.clone()).to_string()});
        };

        info!(session_id = %ctx.session_id, tool = %call.name, "Running tool");
        match tool.call(ctx, call.arguments.clone()).await {
            Ok(result) => result,
            Err(e) => {
                warn!(session_id = %ctx.session_id, tool = %call.name, error = %e, "Tool failed");
                json!({"error": e.to_string()})
            }
        }
    }
}
