use serde::{Deserialize, Serialize};

/// An assistant as shown to the chat UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VapiAssistant {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub names: Vec<VapiAssistant>,
}

/// Assistant record as returned by the Vapi API. Only the fields we use.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RemoteAssistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<RemoteAssistant> for VapiAssistant {
    fn from(remote: RemoteAssistant) -> Self {
        Self {
            id: remote.id,
            name: remote.name.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transcriber {
    pub provider: String,
    pub model: String,
    pub language: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelMessage {
    pub role: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomLlmModel {
    pub provider: String,
    pub url: String,
    pub model: String,
    pub messages: Vec<ModelMessage>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    pub model: String,
    pub input_min_characters: u32,
}

/// Body of `POST /assistant`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    pub name: String,
    pub transcriber: Transcriber,
    pub model: CustomLlmModel,
    pub voice: Voice,
    pub first_message: String,
    pub voicemail_message: String,
    pub end_call_message: String,
}

impl CreateAssistantRequest {
    /// The support-desk phone assistant: Deepgram in, OpenAI TTS out, and
    /// every turn answered by our own `/chat/completions`.
    pub fn support_desk(name: impl Into<String>, custom_llm_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transcriber: Transcriber {
                provider: "deepgram".to_string(),
                model: "nova-3".to_string(),
                language: "en".to_string(),
            },
            model: CustomLlmModel {
                provider: "custom-llm".to_string(),
                url: custom_llm_url.into(),
                model: "gpt-4o".to_string(),
                messages: vec![ModelMessage {
                    role: "system".to_string(),
                    content: "You are an EV charging station assistant.".to_string(),
                }],
            },
            voice: Voice {
                provider: "openai".to_string(),
                voice_id: Some("alloy".to_string()),
                model: "gpt-4o-mini-tts".to_string(),
                input_min_characters: 10,
            },
            first_message: "Hello. I am Mike. How can I assist you?".to_string(),
            voicemail_message: "Please call back when you're available.".to_string(),
            end_call_message: "Goodbye.".to_string(),
        }
    }
}

/// Per-call settings layered over the assistant definition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantOverrides {
    pub recording_enabled: bool,
    pub interruptions_enabled: bool,
}

/// Body of `POST /call/web`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebCallRequest {
    pub assistant_id: String,
    pub assistant_overrides: AssistantOverrides,
}

impl WebCallRequest {
    /// A support call: nothing is recorded and the caller cannot barge in
    /// while the assistant speaks.
    pub fn support_call(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            assistant_overrides: AssistantOverrides {
                recording_enabled: false,
                interruptions_enabled: false,
            },
        }
    }
}

/// A browser call created on the Vapi side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebCall {
    pub id: String,
    /// Room the browser joins to talk to the assistant.
    pub web_call_url: String,
    /// Live-call control endpoint, used to hang up.
    pub control_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoteCall {
    pub id: String,
    #[serde(default)]
    pub web_call_url: Option<String>,
    #[serde(default)]
    pub monitor: Option<RemoteMonitor>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoteMonitor {
    #[serde(default)]
    pub control_url: Option<String>,
}

/// Where the UI's voice call button stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Inactive,
    Loading,
    Active,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCallStatus {
    pub state: CallState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_call_url: Option<String>,
}

impl VoiceCallStatus {
    pub fn inactive() -> Self {
        Self {
            state: CallState::Inactive,
            call_id: None,
            web_call_url: None,
        }
    }
}
