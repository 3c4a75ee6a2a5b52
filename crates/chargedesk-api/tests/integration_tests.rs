//! Integration tests for the ChargeDesk API.
//!
//! Every test builds its own router over a scripted LLM client and a mock
//! station backend with zero delays, then drives it with `oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use chargedesk_api::handlers::{
    HealthResponse, SessionListResponse, SessionMessagesResponse, StationListResponse,
    SESSION_ID_HEADER,
};
use chargedesk_api::{create_router, AppState};
use chargedesk_chat::tools::interim::CHECKING_MESSAGE;
use chargedesk_chat::ChatOrchestrator;
use chargedesk_core::config::StationConfig;
use chargedesk_core::{ChargeDeskConfig, LlmProviderKind, MessageRole};
use chargedesk_llm::{
    LlmClient, LlmError, LlmMessage, LlmRegistry, LlmResponse, Role, ScriptedClient, ToolCall,
};
use chargedesk_station::MockStationService;
use chargedesk_voice::{
    AssistantDirectory, CallLauncher, CreateAssistantRequest, VapiAssistant, VoiceCallService,
    VoiceError, VoiceService, WebCall, WebCallRequest,
};

// =============================================================================
// Helpers
// =============================================================================

fn instant_stations() -> Arc<MockStationService> {
    Arc::new(MockStationService::with_seed(
        StationConfig {
            check_delay_ms: [0, 0],
            reboot_delay_ms: [0, 0],
            ..StationConfig::default()
        },
        7,
    ))
}

fn make_state_with(
    config: ChargeDeskConfig,
    clients: Vec<Arc<dyn LlmClient>>,
    voice: Option<VoiceService>,
) -> AppState {
    let orchestrator =
        ChatOrchestrator::new(&config, LlmRegistry::from_clients(clients), instant_stations());
    AppState::new(config, orchestrator, voice)
}

fn scripted(responses: Vec<LlmResponse>) -> Arc<dyn LlmClient> {
    Arc::new(ScriptedClient::new(responses))
}

/// Router over a single OpenAI-tagged scripted client.
fn make_app(responses: Vec<LlmResponse>) -> axum::Router {
    create_router(make_state_with(
        ChargeDeskConfig::default(),
        vec![scripted(responses)],
        None,
    ))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// Read full response body bytes.
async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

/// Split an SSE body into its `data:` payloads.
fn sse_payloads(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.trim_start().to_string())
        .collect()
}

/// Content deltas of a completion stream, in order.
fn contents(payloads: &[String]) -> Vec<String> {
    payloads
        .iter()
        .filter(|p| p.as_str() != "[DONE]")
        .map(|p| serde_json::from_str::<Value>(p).unwrap())
        .filter_map(|chunk| {
            chunk["choices"][0]["delta"]["content"]
                .as_str()
                .map(str::to_string)
        })
        .collect()
}

fn user_turn(text: &str, session_id: &str) -> Value {
    json!({
        "model": "gpt-4o",
        "stream": true,
        "session_id": session_id,
        "messages": [{"role": "user", "content": text}]
    })
}

#[derive(Default)]
struct FakeDirectory {
    assistants: Mutex<Vec<VapiAssistant>>,
}

#[async_trait]
impl AssistantDirectory for FakeDirectory {
    async fn list_assistants(&self) -> Result<Vec<VapiAssistant>, VoiceError> {
        Ok(self.assistants.lock().unwrap().clone())
    }

    async fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> Result<VapiAssistant, VoiceError> {
        let assistant = VapiAssistant {
            id: "asst-new".to_string(),
            name: request.name.clone(),
        };
        self.assistants.lock().unwrap().push(assistant.clone());
        Ok(assistant)
    }
}

#[derive(Default)]
struct FakeLauncher {
    started: Mutex<Vec<WebCallRequest>>,
    ended: Mutex<Vec<String>>,
}

#[async_trait]
impl CallLauncher for FakeLauncher {
    async fn start_web_call(&self, request: &WebCallRequest) -> Result<WebCall, VoiceError> {
        self.started.lock().unwrap().push(request.clone());
        Ok(WebCall {
            id: "call_1".to_string(),
            web_call_url: "https://room.test/call_1".to_string(),
            control_url: None,
        })
    }

    async fn end_call(&self, call: &WebCall) -> Result<(), VoiceError> {
        self.ended.lock().unwrap().push(call.id.clone());
        Ok(())
    }
}

fn session_header(resp: &axum::response::Response) -> String {
    resp.headers()[SESSION_ID_HEADER].to_str().unwrap().to_string()
}

// =============================================================================
// Health and UI
// =============================================================================

#[tokio::test]
async fn test_health_happy_path() {
    let app = make_app(vec![]);
    let resp = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.active_sessions, 0);
    assert_eq!(health.providers, vec!["openai".to_string()]);
}

#[tokio::test]
async fn test_ui_served_at_root_and_ui() {
    for uri in ["/", "/ui"] {
        let resp = make_app(vec![]).oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(html.contains("EV Station Support"));
    }
}

// =============================================================================
// /chat/completions
// =============================================================================

#[tokio::test]
async fn test_completion_streams_openai_chunks() {
    let app = make_app(vec![LlmResponse::text(
        "Welcome to the EV Station Support! How can I help you today?",
    )]);
    let resp = app
        .oneshot(post_json("/chat/completions", user_turn("hello", "tab-1")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let payloads = sse_payloads(&body_bytes(resp).await);
    assert_eq!(payloads.last().map(String::as_str), Some("[DONE]"));

    let chunks: Vec<Value> = payloads[..payloads.len() - 1]
        .iter()
        .map(|p| serde_json::from_str(p).unwrap())
        .collect();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0]["choices"][0]["delta"]["role"], "assistant");
    assert_eq!(
        chunks[1]["choices"][0]["delta"]["content"],
        "Welcome to the EV Station Support! How can I help you today?"
    );
    assert_eq!(chunks[2]["choices"][0]["finish_reason"], "stop");
    assert!(chunks.iter().all(|c| c["object"] == "chat.completion.chunk"));
    assert!(chunks.iter().all(|c| c["id"] == chunks[0]["id"]));
}

#[tokio::test]
async fn test_completion_with_tool_round_streams_interim_message() {
    let app = make_app(vec![
        LlmResponse::tool_calls(vec![
            ToolCall::new("call_1", "send_checking_message", json!({})),
            ToolCall::new("call_2", "check_station_status", json!({"station_id": "st001"})),
        ]),
        LlmResponse::text("Station ST001 is online but its connector is stuck."),
    ]);
    let resp = app
        .oneshot(post_json(
            "/chat/completions",
            user_turn("My connector at ST001 is stuck", "tab-2"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let payloads = sse_payloads(&body_bytes(resp).await);
    assert_eq!(
        contents(&payloads),
        vec![
            CHECKING_MESSAGE.to_string(),
            "Station ST001 is online but its connector is stuck.".to_string()
        ]
    );
}

#[tokio::test]
async fn test_completion_without_user_message_is_400() {
    let app = make_app(vec![]);
    let resp = app
        .oneshot(post_json(
            "/chat/completions",
            json!({"messages": [{"role": "system", "content": "You are helpful."}]}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "bad_request");
    assert_eq!(json["message"], "No user message provided");
}

#[tokio::test]
async fn test_completion_blank_user_message_is_400() {
    let app = make_app(vec![]);
    let resp = app
        .oneshot(post_json(
            "/chat/completions",
            json!({"messages": [
                {"role": "user", "content": "My connector is stuck"},
                {"role": "user", "content": "   "}
            ]}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["message"], "message cannot be empty");
}

#[tokio::test]
async fn test_completion_returns_session_header() {
    let resp = make_app(vec![LlmResponse::text("Hi")])
        .oneshot(post_json("/chat/completions", user_turn("hello", "tab-h")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(session_header(&resp), "tab-h");
}

#[tokio::test]
async fn test_id_less_client_continues_via_session_header() {
    let client = Arc::new(ScriptedClient::new(vec![
        LlmResponse::text("Which station?"),
        LlmResponse::text("Checking ST002."),
    ]));
    let state = make_state_with(
        ChargeDeskConfig::default(),
        vec![client.clone() as Arc<dyn LlmClient>],
        None,
    );
    let app = create_router(state.clone());

    let resp = app
        .clone()
        .oneshot(post_json(
            "/chat/completions",
            json!({"messages": [{"role": "user", "content": "My connector is stuck"}]}),
        ))
        .await
        .unwrap();
    let session_id = session_header(&resp);
    assert!(uuid::Uuid::parse_str(&session_id).is_ok());
    let _ = body_bytes(resp).await;

    // The client replays the transcript, as OpenAI-style clients do.
    let resp = app
        .oneshot(post_json(
            "/chat/completions",
            json!({
                "session_id": session_id,
                "messages": [
                    {"role": "user", "content": "My connector is stuck"},
                    {"role": "assistant", "content": "Which station?"},
                    {"role": "user", "content": "ST002"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(session_header(&resp), session_id);
    let _ = body_bytes(resp).await;

    let second = &client.requests()[1];
    assert_eq!(
        &second.messages[1..],
        &[
            LlmMessage::user("My connector is stuck"),
            LlmMessage::assistant("Which station?"),
            LlmMessage::user("ST002"),
        ]
    );
    assert_eq!(state.orchestrator.history(&session_id).unwrap().len(), 4);
    assert_eq!(state.orchestrator.active_agents(), 1);
}

#[tokio::test]
async fn test_id_less_replayed_history_seeds_new_session() {
    let client = Arc::new(ScriptedClient::new(vec![LlmResponse::text(
        "Station ST002 is offline.",
    )]));
    let state = make_state_with(
        ChargeDeskConfig::default(),
        vec![client.clone() as Arc<dyn LlmClient>],
        None,
    );

    let resp = create_router(state.clone())
        .oneshot(post_json(
            "/chat/completions",
            json!({
                "messages": [
                    {"role": "system", "content": "You are helpful."},
                    {"role": "user", "content": "My connector is stuck"},
                    {"role": "assistant", "content": "Which station?"},
                    {"role": "user", "content": "ST002"}
                ]
            }),
        ))
        .await
        .unwrap();
    let session_id = session_header(&resp);
    let _ = body_bytes(resp).await;

    let first = &client.requests()[0];
    let roles: Vec<Role> = first.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(first.messages[1], LlmMessage::user("My connector is stuck"));

    let history = state.orchestrator.history(&session_id).unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[3].content, "Station ST002 is offline.");
}

#[tokio::test]
async fn test_completion_malformed_json_is_rejected() {
    let app = make_app(vec![]);
    let resp = app
        .oneshot(
            Request::post("/chat/completions")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_completion_llm_failure_becomes_content_chunk() {
    let client: Arc<dyn LlmClient> = Arc::new(ScriptedClient::from_results(vec![Err(
        LlmError::Provider {
            status: 500,
            message: "upstream exploded".to_string(),
        },
    )]));
    let app = create_router(make_state_with(ChargeDeskConfig::default(), vec![client], None));

    let resp = app
        .oneshot(post_json("/chat/completions", user_turn("hello", "tab-3")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let payloads = sse_payloads(&body_bytes(resp).await);
    let texts = contents(&payloads);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("upstream exploded"));
    assert_eq!(payloads.last().map(String::as_str), Some("[DONE]"));
}

#[tokio::test]
async fn test_completion_without_providers_is_503() {
    let app = create_router(make_state_with(ChargeDeskConfig::default(), vec![], None));
    let resp = app
        .oneshot(post_json("/chat/completions", user_turn("hello", "tab-4")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_voice_session_uses_last_user_message() {
    let mut config = ChargeDeskConfig::default();
    config.vapi.session_id = Some("vapi-call".to_string());
    let client = Arc::new(ScriptedClient::new(vec![LlmResponse::text("Sure.")]));
    let state = make_state_with(
        config,
        vec![client.clone() as Arc<dyn LlmClient>],
        None,
    );
    let app = create_router(state.clone());

    let resp = app
        .oneshot(post_json(
            "/chat/completions",
            json!({
                "messages": [
                    {"role": "assistant", "content": "Hello. I am Mike. How can I assist you?"},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "How can I help?"},
                    {"role": "user", "content": "reboot station ST002"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let _ = body_bytes(resp).await;

    let history = state.orchestrator.history("vapi-call").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].content, "reboot station ST002");

    let sent = client.requests();
    assert_eq!(sent.len(), 1);
    let user_messages: Vec<_> = sent[0]
        .messages
        .iter()
        .filter(|m| m.role == Role::User)
        .collect();
    assert_eq!(user_messages.len(), 1);
}

#[tokio::test]
async fn test_requested_provider_selects_client() {
    let openai = Arc::new(ScriptedClient::new(vec![LlmResponse::text("from openai")]));
    let groq = Arc::new(
        ScriptedClient::new(vec![LlmResponse::text("from groq")])
            .with_provider(LlmProviderKind::Groq),
    );
    let app = create_router(make_state_with(
        ChargeDeskConfig::default(),
        vec![openai.clone() as Arc<dyn LlmClient>, groq.clone() as Arc<dyn LlmClient>],
        None,
    ));

    let resp = app
        .oneshot(post_json(
            "/chat/completions",
            json!({
                "session_id": "tab-groq",
                "provider": "groq",
                "messages": [{"role": "user", "content": "hello"}]
            }),
        ))
        .await
        .unwrap();

    let payloads = sse_payloads(&body_bytes(resp).await);
    assert_eq!(contents(&payloads), vec!["from groq".to_string()]);
    assert!(openai.requests().is_empty());
    assert_eq!(groq.requests().len(), 1);
}

// =============================================================================
// Session inspection
// =============================================================================

#[tokio::test]
async fn test_sessions_list_messages_and_delete() {
    let state = make_state_with(
        ChargeDeskConfig::default(),
        vec![scripted(vec![LlmResponse::text("Hi there!")])],
        None,
    );
    let app = create_router(state);

    let resp = app
        .clone()
        .oneshot(post_json("/chat/completions", user_turn("hello", "tab-5")))
        .await
        .unwrap();
    let _ = body_bytes(resp).await;

    let resp = app.clone().oneshot(get("/chat/sessions")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list: SessionListResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.sessions[0].session_id, "tab-5");
    assert_eq!(list.sessions[0].user_id, "VAPI");
    assert_eq!(list.sessions[0].message_count, 2);

    let resp = app
        .clone()
        .oneshot(get("/chat/sessions/tab-5/messages"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let transcript: SessionMessagesResponse =
        serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(transcript.session_id, "tab-5");
    assert_eq!(transcript.messages[0].content, "hello");
    assert_eq!(transcript.messages[1].content, "Hi there!");

    let resp = app
        .clone()
        .oneshot(
            Request::delete("/chat/sessions/tab-5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(get("/chat/sessions/tab-5/messages"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_delete_unknown_session_is_404() {
    let resp = make_app(vec![])
        .oneshot(
            Request::delete("/chat/sessions/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Voice assistant management
// =============================================================================

#[tokio::test]
async fn test_voice_endpoints_503_without_vapi() {
    for uri in ["/chat/load_assistants", "/chat/create_new_assistant"] {
        let resp = make_app(vec![])
            .oneshot(Request::post(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(json["error"], "service_unavailable");
    }
}

#[tokio::test]
async fn test_voice_create_then_load_assistants() {
    let directory = Arc::new(FakeDirectory::default());
    let voice = VoiceService::new(
        directory,
        Some("ChargeDesk".to_string()),
        Some("https://chargedesk.test/chat/completions".to_string()),
    );
    let app = create_router(make_state_with(
        ChargeDeskConfig::default(),
        vec![scripted(vec![])],
        Some(voice),
    ));

    let resp = app
        .clone()
        .oneshot(Request::post("/chat/create_new_assistant").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(created, json!({"id": "asst-new", "name": "ChargeDesk"}));

    let resp = app
        .oneshot(Request::post("/chat/load_assistants").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let loaded: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(loaded, json!({"names": [{"id": "asst-new", "name": "ChargeDesk"}]}));
}

// =============================================================================
// Browser voice calls
// =============================================================================

#[tokio::test]
async fn test_voice_call_endpoints_503_without_config() {
    let app = make_app(vec![]);
    for request in [
        get("/chat/voice_call"),
        Request::post("/chat/voice_call/start").body(Body::empty()).unwrap(),
        Request::post("/chat/voice_call/stop").body(Body::empty()).unwrap(),
    ] {
        let resp = app.clone().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

#[tokio::test]
async fn test_voice_call_start_and_stop() {
    let launcher = Arc::new(FakeLauncher::default());
    let state = make_state_with(ChargeDeskConfig::default(), vec![scripted(vec![])], None)
        .with_voice_calls(Some(VoiceCallService::new(launcher.clone(), "asst_1")));
    let app = create_router(state);
    let post = |uri: &str| Request::post(uri).body(Body::empty()).unwrap();

    let resp = app.clone().oneshot(get("/chat/voice_call")).await.unwrap();
    let status: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(status, json!({"state": "inactive"}));

    let resp = app.clone().oneshot(post("/chat/voice_call/start")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(
        status,
        json!({"state": "active", "call_id": "call_1", "web_call_url": "https://room.test/call_1"})
    );
    let started = launcher.started.lock().unwrap().clone();
    assert_eq!(started, vec![WebCallRequest::support_call("asst_1")]);

    let resp = app.clone().oneshot(post("/chat/voice_call/start")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app.clone().oneshot(post("/chat/voice_call/stop")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let status: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(status["state"], "inactive");
    assert_eq!(*launcher.ended.lock().unwrap(), vec!["call_1".to_string()]);

    let resp = app.oneshot(get("/chat/voice_call")).await.unwrap();
    let status: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(status["state"], "inactive");
}

// =============================================================================
// Stations
// =============================================================================

#[tokio::test]
async fn test_stations_lists_backend_snapshot() {
    let resp = make_app(vec![]).oneshot(get("/stations")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let list: StationListResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(list.total, 5);
    let ids: Vec<&str> = list.stations.iter().map(|s| s.station_id.as_str()).collect();
    assert_eq!(ids, vec!["ST001", "ST002", "ST003", "ST004", "ST005"]);
}

// =============================================================================
// Middleware
// =============================================================================

#[tokio::test]
async fn test_chat_routes_are_rate_limited() {
    let mut config = ChargeDeskConfig::default();
    config.server.rate_limit_per_sec = 1;
    let app = create_router(make_state_with(config, vec![scripted(vec![])], None));

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let resp = app.clone().oneshot(get("/chat/sessions")).await.unwrap();
        statuses.push(resp.status());
    }
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));

    // Health is outside the limiter.
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let resp = make_app(vec![])
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/chat/completions")
                .header("origin", "https://dashboard.vapi.ai")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_cors_exposes_session_header() {
    let resp = make_app(vec![LlmResponse::text("Hi")])
        .oneshot(
            Request::post("/chat/completions")
                .header("origin", "https://support.example")
                .header("content-type", "application/json")
                .body(Body::from(user_turn("hello", "tab-cors").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let exposed = resp.headers()["access-control-expose-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains(SESSION_ID_HEADER));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let resp = make_app(vec![]).oneshot(get("/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
