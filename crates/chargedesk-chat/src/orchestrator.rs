//! Chat orchestrator: owns the per-session agents and their shared services.
//!
//! Resolves who a request belongs to, hands back the session's agent
//! (creating it on first contact), and exposes session inspection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use uuid::Uuid;

use chargedesk_core::{ChargeDeskConfig, ChatMessage, LlmProviderKind};
use chargedesk_llm::LlmRegistry;
use chargedesk_station::StationBackend;

use crate::agent::ChatbotAgent;
use crate::error::ChatError;
use crate::session::{ChatService, ChatSessionSummary};
use crate::tools::ToolRegistry;

/// Who a chat request belongs to and which model should answer it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: String,
    pub provider: LlmProviderKind,
}

/// The slice of configuration the orchestrator needs.
#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    pub default_provider: LlmProviderKind,
    pub default_user_id: String,
    /// Session id Vapi calls arrive on, if voice is configured.
    pub voice_session_id: Option<String>,
    pub max_tool_rounds: usize,
}

impl OrchestratorSettings {
    pub fn from_config(config: &ChargeDeskConfig) -> Self {
        Self {
            default_provider: config.llm.provider,
            default_user_id: config.session.default_user_id.clone(),
            voice_session_id: config.vapi.session_id.clone().filter(|s| !s.is_empty()),
            max_tool_rounds: config.llm.max_tool_rounds,
        }
    }
}

pub struct ChatOrchestrator {
    agents: Mutex<HashMap<String, Arc<ChatbotAgent>>>,
    llms: LlmRegistry,
    stations: Arc<dyn StationBackend>,
    sessions: Arc<ChatService>,
    tools: Arc<ToolRegistry>,
    settings: OrchestratorSettings,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl ChatOrchestrator {
    pub fn new(
        config: &ChargeDeskConfig,
        llms: LlmRegistry,
        backend: Arc<dyn StationBackend>,
    ) -> Self {
        let sessions = Arc::new(ChatService::new());
        let tools = Arc::new(ToolRegistry::support_tools(
            Arc::clone(&backend),
            Arc::clone(&sessions),
            &config.session,
        ));
        Self {
            agents: Mutex::new(HashMap::new()),
            llms,
            stations: backend,
            sessions,
            tools,
            settings: OrchestratorSettings::from_config(config),
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn llms(&self) -> &LlmRegistry {
        &self.llms
    }

    pub fn sessions(&self) -> &Arc<ChatService> {
        &self.sessions
    }

    /// The station backend the support tools act on.
    pub fn stations(&self) -> &Arc<dyn StationBackend> {
        &self.stations
    }

    /// Fill in missing request identity from configuration.
    ///
    /// No session id means a Vapi call when voice is configured, otherwise a
    /// fresh anonymous session. Unknown provider names keep the default.
    pub fn resolve_session_info(
        &self,
        session_id: Option<&str>,
        user_id: Option<&str>,
        provider: Option<&str>,
    ) -> SessionInfo {
        let session_id = non_empty(session_id)
            .map(str::to_string)
            .or_else(|| self.settings.voice_session_id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let user_id = non_empty(user_id)
            .map(str::to_string)
            .unwrap_or_else(|| self.settings.default_user_id.clone());
        let provider = match non_empty(provider) {
            Some(name) => name.parse::<LlmProviderKind>().unwrap_or_else(|e| {
                warn!(requested = name, error = %e, "Unknown provider, using default");
                self.settings.default_provider
            }),
            None => self.settings.default_provider,
        };

        SessionInfo {
            session_id,
            user_id,
            provider,
        }
    }

    /// Whether requests on this session come from the voice platform.
    pub fn is_voice_session(&self, session_id: &str) -> bool {
        self.settings.voice_session_id.as_deref() == Some(session_id)
    }

    /// The session's agent, created on first use.
    ///
    /// An existing agent keeps the provider it was created with.
    pub fn get_or_create_agent(&self, info: &SessionInfo) -> Result<Arc<ChatbotAgent>, ChatError> {
        self.get_or_create_agent_with_history(info, Vec::new())
    }

    /// Like [`get_or_create_agent`](Self::get_or_create_agent), but a newly
    /// created agent starts from `prior`, the transcript the client sent
    /// ahead of its current message. Ignored when the agent already exists.
    pub fn get_or_create_agent_with_history(
        &self,
        info: &SessionInfo,
        prior: Vec<ChatMessage>,
    ) -> Result<Arc<ChatbotAgent>, ChatError> {
        let mut agents = self
            .agents
            .lock()
            .map_err(|e| ChatError::StorageError(format!("agent lock poisoned: {}", e)))?;

        if let Some(agent) = agents.get(&info.session_id) {
            return Ok(Arc::clone(agent));
        }

        if !self.sessions.contains(&info.session_id)? {
            self.sessions.create_session(&info.user_id, &info.session_id)?;
        }
        let llm = self.llms.get(info.provider)?;
        info!(
            session_id = %info.session_id,
            user_id = %info.user_id,
            provider = %llm.provider(),
            model = llm.model(),
            prior_messages = prior.len(),
            "Creating agent"
        );

        let agent = Arc::new(
            ChatbotAgent::new(
                info.session_id.clone(),
                info.user_id.clone(),
                llm,
                Arc::clone(&self.tools),
                Arc::clone(&self.sessions),
                self.settings.max_tool_rounds,
            )
            .with_history(prior),
        );
        agents.insert(info.session_id.clone(), Arc::clone(&agent));
        Ok(agent)
    }

    pub fn active_agents(&self) -> usize {
        self.agents.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn list_sessions(&self) -> Result<Vec<ChatSessionSummary>, ChatError> {
        self.sessions.list_sessions()
    }

    pub fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, ChatError> {
        self.sessions
            .history(session_id)?
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))
    }

    /// Forget a session and its agent.
    pub fn delete_session(&self, session_id: &str) -> Result<(), ChatError> {
        let agent_removed = self
            .agents
            .lock()
            .map_err(|e| ChatError::StorageError(format!("agent lock poisoned: {}", e)))?
            .remove(session_id)
            .is_some();
        let session_removed = self.sessions.delete_session(session_id)?;

        if agent_removed || session_removed {
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(session_id.to_string()))
        }
    }
}
