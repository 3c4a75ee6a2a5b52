//! Interim "please wait" messages sent before slow station operations.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use chargedesk_llm::ToolDefinition;

use super::{no_parameters, ChatTool, ToolContext};
use crate::error::ChatError;

pub const CHECKING_MESSAGE: &str = " Checking... please wait ";
pub const REBOOTING_MESSAGE: &str = " Rebooting the station... please wait ";

pub struct InterimMessageTool {
    name: &'static str,
    description: &'static str,
    message: &'static str,
}

impl InterimMessageTool {
    pub fn checking() -> Self {
        Self {
            name: "send_checking_message",
            description: "Send a message to the user indicating that the system is checking the \
                station status. Use this tool BEFORE calling check_station_status. The message is \
                streamed to the user immediately, before the slow status check runs.",
            message: CHECKING_MESSAGE,
        }
    }

    pub fn rebooting() -> Self {
        Self {
            name: "send_rebooting_message",
            description: "Send a message to the user indicating that the system is rebooting the \
                station. Use this tool BEFORE calling reboot_station. The message is streamed to \
                the user immediately, before the reboot starts.",
            message: REBOOTING_MESSAGE,
        }
    }
}

#[async_trait]
impl ChatTool for InterimMessageTool {
    fn name(&self) -> &'static str {
        self.name
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters: no_parameters(),
        }
    }

    async fn call(&self, ctx: &ToolContext, _args: Value) -> Result<Value, ChatError> {
        info!(session_id = %ctx.session_id, message = self.message, "Sending interim message");
        ctx.send_intermediate(self.message);
        Ok(json!({"message": self.message}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentEvent;
    use crate::tools::test_support;

    #[tokio::test]
    async fn test_checking_message_is_streamed_and_returned() {
        let (ctx, mut rx) = test_support::context();
        let result = InterimMessageTool::checking().call(&ctx, json!({})).await.unwrap();

        assert_eq!(result, json!({"message": " Checking... please wait "}));
        assert_eq!(
            rx.try_recv().unwrap(),
            AgentEvent::Intermediate(CHECKING_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_rebooting_message_survives_closed_client() {
        let (ctx, rx) = test_support::context();
        drop(rx);
        let result = InterimMessageTool::rebooting().call(&ctx, Value::Null).await.unwrap();
        assert_eq!(result["message"], REBOOTING_MESSAGE);
    }
}
