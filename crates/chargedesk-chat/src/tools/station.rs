//! Station status and reboot tools.
//!
//! The reboot tool is where the per-session reboot cap lives: the model is
//! told about the limit in the prompt, but the tool refuses regardless.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use chargedesk_core::RebootRequest;
use chargedesk_llm::ToolDefinition;
use chargedesk_station::{normalize_station_id, StationBackend};

use super::{parse_args, ChatTool, ToolContext};
use crate::error::ChatError;
use crate::session::ChatService;

const REBOOT_REASON: &str = "User requested reboot due to stuck connector";

#[derive(Debug, Deserialize)]
struct StationArgs {
    station_id: String,
}

fn station_id_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "station_id": {
                "type": "string",
                "description": "The ID of the station (e.g., ST001)"
            }
        },
        "required": ["station_id"]
    })
}

pub struct CheckStationStatusTool {
    backend: Arc<dyn StationBackend>,
}

impl CheckStationStatusTool {
    pub fn new(backend: Arc<dyn StationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ChatTool for CheckStationStatusTool {
    fn name(&self) -> &'static str {
        "check_station_status"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Check the status of an EV charging station. Returns whether it is online, \
                its connector status, and whether the connector is problematic (stuck or error)."
                .to_string(),
            parameters: station_id_parameters(),
        }
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ChatError> {
        let args: StationArgs = parse_args(self.name(), args)?;
        let station_id = normalize_station_id(&args.station_id);
        info!(session_id = %ctx.session_id, station_id = %station_id, "Checking station status");

        let Some(status) = self.backend.check_station_status(&station_id).await? else {
            return Ok(json!({
                "found": false,
                "message": format!("Station {} not found", station_id),
            }));
        };

        let state = if status.is_online { "online" } else { "offline" };
        Ok(json!({
            "found": true,
            "is_online": status.is_online,
            "connector_status": status.connector_status,
            "last_seen": status.last_seen.to_rfc3339(),
            "message": format!(
                "Station {} is {} with connector status: {}",
                status.station_id, state, status.connector_status
            ),
            "is_problematic": status.connector_status.is_problematic(),
        }))
    }
}

pub struct RebootStationTool {
    backend: Arc<dyn StationBackend>,
    sessions: Arc<ChatService>,
    limit: u32,
    window_secs: u64,
}

impl RebootStationTool {
    pub fn new(
        backend: Arc<dyn StationBackend>,
        sessions: Arc<ChatService>,
        limit: u32,
        window_secs: u64,
    ) -> Self {
        Self {
            backend,
            sessions,
            limit,
            window_secs,
        }
    }

    fn blocked_message(&self) -> String {
        format!(
            "Station reboot attempts are blocked as you have used {} attempts. \
             Please try again after {}. Thank you.",
            self.limit,
            retry_after(self.window_secs)
        )
    }
}

/// Whole minutes when the window divides evenly, seconds otherwise.
fn retry_after(window_secs: u64) -> String {
    let (amount, unit) = if window_secs >= 60 && window_secs % 60 == 0 {
        (window_secs / 60, "minute")
    } else {
        (window_secs, "second")
    };
    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}

#[async_trait]
impl ChatTool for RebootStationTool {
    fn name(&self) -> &'static str {
        "reboot_station"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Reboot an EV charging station when the connector is stuck or unresponsive."
                .to_string(),
            parameters: station_id_parameters(),
        }
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ChatError> {
        let args: StationArgs = parse_args(self.name(), args)?;
        let station_id = normalize_station_id(&args.station_id);
        let session_id = ctx.session_id.as_str();

        if self
            .sessions
            .should_reset_reboot_count(session_id, self.window_secs)?
        {
            self.sessions.reset_reboot_count(session_id)?;
        }

        let used = self.sessions.get_reboot_count(session_id)?;
        if used >= self.limit {
            info!(session_id, station_id = %station_id, used, "Reboot blocked by session cap");
            return Ok(json!({
                "success": false,
                "station_id": station_id,
                "message": self.blocked_message(),
            }));
        }

        info!(session_id, station_id = %station_id, used, "Rebooting station");
        self.sessions.increment_reboot_count(session_id)?;

        let request = RebootRequest::new(station_id).with_reason(REBOOT_REASON);
        let result = self.backend.reboot_station(request).await?;
        Ok(json!({
            "success": result.success,
            "message": result.message,
            "station_id": result.station_id,
        }))
    }
}
