//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its request via axum extractors, calls into the
//! chat orchestrator or the voice service, and returns JSON or SSE.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use chargedesk_chat::{ChatError, ChatSessionSummary};
use chargedesk_core::{ChatMessage, StationStatus};
use chargedesk_station::StationBackend;
use chargedesk_voice::{
    AssistantResponse, VapiAssistant, VoiceCallService, VoiceCallStatus, VoiceService,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::{sse_events, ChunkBuilder};

// =============================================================================
// Request / response types
// =============================================================================

/// One message of an OpenAI-style request.
///
/// `content` is kept as raw JSON: Vapi sends `null` for some roles.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

impl IncomingMessage {
    fn is_user(&self) -> bool {
        self.role.eq_ignore_ascii_case("user")
    }

    fn is_assistant(&self) -> bool {
        self.role.eq_ignore_ascii_case("assistant")
    }

    fn text(&self) -> Option<&str> {
        self.content.as_str().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Body of `POST /chat/completions`. Other OpenAI/Vapi fields are ignored.
#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    pub provider: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    pub providers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<ChatSessionSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionMessagesResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StationListResponse {
    pub stations: Vec<StationStatus>,
    pub total: usize,
}

/// Response header naming the session a completion ran on. Clients that sent
/// no `session_id` echo it back to continue the conversation.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Messages that belong to this turn.
///
/// Vapi resends the whole call transcript every turn while the agent keeps
/// its own thread, so voice sessions keep only the newest user message.
pub fn turn_messages(messages: &[IncomingMessage], voice_session: bool) -> Vec<IncomingMessage> {
    if voice_session {
        messages
            .iter()
            .rev()
            .find(|m| m.is_user())
            .cloned()
            .into_iter()
            .collect()
    } else {
        messages.to_vec()
    }
}

/// The newest user message and everything sent before it.
pub fn split_last_user(
    messages: &[IncomingMessage],
) -> Option<(&[IncomingMessage], &IncomingMessage)> {
    let index = messages.iter().rposition(IncomingMessage::is_user)?;
    Some((&messages[..index], &messages[index]))
}

/// User and assistant text from a client-held transcript, oldest first.
pub fn prior_transcript(messages: &[IncomingMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter_map(|m| {
            let text = m.text()?;
            if m.is_user() {
                Some(ChatMessage::user(text))
            } else if m.is_assistant() {
                Some(ChatMessage::assistant(text))
            } else {
                None
            }
        })
        .collect()
}

// =============================================================================
// Chat
// =============================================================================

/// POST /chat/completions - run one agent turn, streamed as OpenAI chunks.
///
/// The first request of a session may carry earlier turns; they seed the new
/// agent's thread. The session id is returned in [`SESSION_ID_HEADER`].
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<CompletionRequest>,
) -> Result<Response, ApiError> {
    let orchestrator = &state.orchestrator;
    let info = orchestrator.resolve_session_info(
        request.session_id.as_deref(),
        request.user_id.as_deref(),
        request.provider.as_deref(),
    );

    let voice_session = orchestrator.is_voice_session(&info.session_id);
    let messages = turn_messages(&request.messages, voice_session);
    if voice_session {
        debug!(
            session_id = %info.session_id,
            received = request.messages.len(),
            "Voice session: keeping only the last user message"
        );
    }

    let (prior, last) = split_last_user(&messages)
        .ok_or_else(|| ApiError::BadRequest("No user message provided".to_string()))?;
    let text = last.text().ok_or(ChatError::EmptyMessage)?.to_string();

    let agent = orchestrator.get_or_create_agent_with_history(&info, prior_transcript(prior))?;
    let builder = ChunkBuilder::new();
    info!(
        session_id = %info.session_id,
        user_id = %info.user_id,
        provider = %agent.provider(),
        completion_id = builder.id(),
        "Streaming chat completion"
    );

    let events = agent.stream_message(text);
    let mut response = Sse::new(sse_events(builder, events))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response();
    match HeaderValue::from_str(&info.session_id) {
        Ok(value) => {
            response.headers_mut().insert(SESSION_ID_HEADER, value);
        }
        Err(e) => warn!(
            session_id = %info.session_id,
            error = %e,
            "Session id is not a valid header value"
        ),
    }
    Ok(response)
}

/// GET /chat/sessions - all in-memory sessions, newest first.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.orchestrator.list_sessions()?;
    let total = sessions.len();
    Ok(Json(SessionListResponse { sessions, total }))
}

/// GET /chat/sessions/{id}/messages - a session's transcript.
pub async fn session_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionMessagesResponse>, ApiError> {
    let messages = state.orchestrator.history(&session_id)?;
    Ok(Json(SessionMessagesResponse {
        session_id,
        messages,
    }))
}

/// DELETE /chat/sessions/{id} - forget a session and its agent.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.delete_session(&session_id)?;
    info!(session_id = %session_id, "Deleted chat session");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Voice
// =============================================================================

fn voice_service(state: &AppState) -> Result<&VoiceService, ApiError> {
    state.voice.as_deref().ok_or_else(|| {
        ApiError::ServiceUnavailable(
            "Voice integration is not configured (set VAPI_API_PRIVATE_KEY)".to_string(),
        )
    })
}

/// POST /chat/load_assistants - list the Vapi assistants.
pub async fn load_assistants(
    State(state): State<AppState>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let assistants = voice_service(&state)?.load_all_assistants().await?;
    Ok(Json(assistants))
}

/// POST /chat/create_new_assistant - find or create the configured assistant.
pub async fn create_new_assistant(
    State(state): State<AppState>,
) -> Result<Json<VapiAssistant>, ApiError> {
    let assistant = voice_service(&state)?.create_new_assistant().await?;
    Ok(Json(assistant))
}

fn voice_calls(state: &AppState) -> Result<&VoiceCallService, ApiError> {
    state.voice_calls.as_deref().ok_or_else(|| {
        ApiError::ServiceUnavailable(
            "Voice calls are not configured (set VAPI_API_PUBLIC_KEY and VAPI_ASSISTANT_ID)"
                .to_string(),
        )
    })
}

/// GET /chat/voice_call - state of the browser voice call.
pub async fn voice_call_status(
    State(state): State<AppState>,
) -> Result<Json<VoiceCallStatus>, ApiError> {
    Ok(Json(voice_calls(&state)?.status()))
}

/// POST /chat/voice_call/start - start a browser voice call.
pub async fn start_voice_call(
    State(state): State<AppState>,
) -> Result<Json<VoiceCallStatus>, ApiError> {
    let status = voice_calls(&state)?.start().await?;
    Ok(Json(status))
}

/// POST /chat/voice_call/stop - hang up the browser voice call.
pub async fn stop_voice_call(
    State(state): State<AppState>,
) -> Result<Json<VoiceCallStatus>, ApiError> {
    let status = voice_calls(&state)?.stop().await?;
    Ok(Json(status))
}

// =============================================================================
// Stations
// =============================================================================

/// GET /stations - every station the backend knows about.
pub async fn list_stations(
    State(state): State<AppState>,
) -> Result<Json<StationListResponse>, ApiError> {
    let stations = state
        .orchestrator
        .stations()
        .list_stations()
        .await
        .map_err(ChatError::from)?;
    let total = stations.len();
    Ok(Json(StationListResponse { stations, total }))
}

// =============================================================================
// Health and UI
// =============================================================================

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = state
        .orchestrator
        .llms()
        .providers()
        .iter()
        .map(|p| p.to_string())
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.orchestrator.sessions().len(),
        providers,
    })
}

/// GET /ui - serve the self-contained chat page.
pub async fn ui() -> impl IntoResponse {
    Html(chargedesk_ui::CHAT_HTML)
}
