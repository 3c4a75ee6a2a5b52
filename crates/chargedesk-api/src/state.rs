//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use chargedesk_chat::ChatOrchestrator;
use chargedesk_core::ChargeDeskConfig;
use chargedesk_voice::{VoiceCallService, VoiceService};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration the server was started with.
    pub config: Arc<ChargeDeskConfig>,
    /// Per-session agents, the session store, and the LLM registry.
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Vapi assistant management; `None` without a private key.
    pub voice: Option<Arc<VoiceService>>,
    /// Browser voice calls; `None` without a public key and assistant id.
    pub voice_calls: Option<Arc<VoiceCallService>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: ChargeDeskConfig,
        orchestrator: ChatOrchestrator,
        voice: Option<VoiceService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            voice: voice.map(Arc::new),
            voice_calls: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_voice_calls(mut self, calls: Option<VoiceCallService>) -> Self {
        self.voice_calls = calls.map(Arc::new);
        self
    }
}
