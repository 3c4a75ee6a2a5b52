use async_trait::async_trait;
use serde_json::{json, Value};

use chargedesk_llm::ToolDefinition;

use super::{no_parameters, ChatTool, ToolContext};
use crate::error::ChatError;

pub const STATION_INSTRUCTIONS: &str = "To find your station number:\n\
1. Look for a sticker or plate on the charging station\n\
2. The station number usually starts with 'ST' followed by numbers (e.g., ST001)\n\
3. It's typically located near the charging connector or on the front panel\n\
4. If you can't find it, look for a QR code that might contain the station ID";

/// Tells the user where to find the station id.
pub struct StationInstructionsTool;

#[async_trait]
impl ChatTool for StationInstructionsTool {
    fn name(&self) -> &'static str {
        "get_station_instructions"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Get instructions for finding the station number on an EV charging station."
                .to_string(),
            parameters: no_parameters(),
        }
    }

    async fn call(&self, _ctx: &ToolContext, _args: Value) -> Result<Value, ChatError> {
        Ok(json!({"instructions": STATION_INSTRUCTIONS}))
    }
}
