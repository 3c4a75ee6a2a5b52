use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Chat
// =============================================================================

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
            MessageRole::Tool => "tool",
        }
    }
}

/// One entry of a session transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-conversation record held in process memory.
///
/// `reboot_count` counts reboots inside the current rate-limit window;
/// `last_reboot_time` is `None` until the first reboot of a window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub user_id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub reboot_count: u32,
    pub last_reboot_time: Option<DateTime<Utc>>,
}

impl ChatSession {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            messages: Vec::new(),
            created_at: Utc::now(),
            reboot_count: 0,
            last_reboot_time: None,
        }
    }
}

// =============================================================================
// Stations
// =============================================================================

/// State of a station's charging connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStatus {
    Available,
    Occupied,
    Stuck,
    Error,
}

impl ConnectorStatus {
    pub const ALL: [ConnectorStatus; 4] = [
        ConnectorStatus::Available,
        ConnectorStatus::Occupied,
        ConnectorStatus::Stuck,
        ConnectorStatus::Error,
    ];

    /// Stuck and errored connectors are candidates for a remote reboot.
    pub fn is_problematic(&self) -> bool {
        matches!(self, ConnectorStatus::Stuck | ConnectorStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorStatus::Available => "available",
            ConnectorStatus::Occupied => "occupied",
            ConnectorStatus::Stuck => "stuck",
            ConnectorStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a simulated charging station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationStatus {
    pub station_id: String,
    pub is_online: bool,
    pub connector_status: ConnectorStatus,
    pub last_seen: DateTime<Utc>,
}

fn default_reboot_reason() -> String {
    "Connector stuck".to_string()
}

/// Request to remotely restart a station.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebootRequest {
    pub station_id: String,
    #[serde(default = "default_reboot_reason")]
    pub reason: String,
}

impl RebootRequest {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            reason: default_reboot_reason(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

/// Outcome of a reboot attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebootResponse {
    pub success: bool,
    pub message: String,
    pub station_id: String,
}

// =============================================================================
// LLM providers
// =============================================================================

/// Hosted (or local) chat-completion backends the agent can talk to.
///
/// Declaration order is the fallback order used when a requested provider
/// is not configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    Openai,
    Ollama,
    Together,
    Groq,
    Gemini,
}

impl LlmProviderKind {
    pub const ALL: [LlmProviderKind; 5] = [
        LlmProviderKind::Openai,
        LlmProviderKind::Ollama,
        LlmProviderKind::Together,
        LlmProviderKind::Groq,
        LlmProviderKind::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProviderKind::Openai => "openai",
            LlmProviderKind::Ollama => "ollama",
            LlmProviderKind::Together => "together",
            LlmProviderKind::Groq => "groq",
            LlmProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProviderKind::Openai),
            "ollama" => Ok(LlmProviderKind::Ollama),
            "together" => Ok(LlmProviderKind::Together),
            "groq" => Ok(LlmProviderKind::Groq),
            "gemini" => Ok(LlmProviderKind::Gemini),
            other => Err(format!(
                "unknown LLM provider '{}'. Must be one of: openai, ollama, together, groq, gemini",
                other
            )),
        }
    }
}
