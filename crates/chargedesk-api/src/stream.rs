//! OpenAI `chat.completion.chunk` framing for agent turns.
//!
//! Vapi's custom-LLM integration and the chat UI both read the same stream:
//! a role chunk, one content chunk per message the agent produces, a stop
//! chunk, and the `[DONE]` sentinel.

use std::convert::Infallible;

use axum::response::sse::Event;
use chrono::Utc;
use futures::future::ready;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chargedesk_chat::AgentEvent;

/// Terminal SSE payload expected by OpenAI-compatible clients.
pub const DONE: &str = "[DONE]";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub choices: Vec<ChunkChoice>,
}

/// Builds the chunks of one completion; they all share an id and timestamp.
#[derive(Clone, Debug)]
pub struct ChunkBuilder {
    id: String,
    created: i64,
}

impl Default for ChunkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self {
            id: format!("chatcmpl-{}", Uuid::new_v4().simple()),
            created: Utc::now().timestamp(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn chunk(&self, delta: ChunkDelta, finish_reason: Option<&str>) -> CompletionChunk {
        CompletionChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_string(),
            created: self.created,
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason: finish_reason.map(str::to_string),
            }],
        }
    }

    pub fn role(&self) -> CompletionChunk {
        self.chunk(
            ChunkDelta {
                role: Some("assistant".to_string()),
                content: None,
            },
            None,
        )
    }

    pub fn content(&self, text: impl Into<String>) -> CompletionChunk {
        self.chunk(
            ChunkDelta {
                role: None,
                content: Some(text.into()),
            },
            None,
        )
    }

    pub fn stop(&self) -> CompletionChunk {
        self.chunk(ChunkDelta::default(), Some("stop"))
    }
}

/// Text the caller should hear or see for an agent event, if any.
pub fn event_text(event: AgentEvent) -> Option<String> {
    match event {
        AgentEvent::Intermediate(text) | AgentEvent::Assistant(text) => {
            Some(text).filter(|t| !t.is_empty())
        }
        AgentEvent::Error(message) => Some(format!(
            "Sorry, something went wrong while handling your request: {}",
            message
        )),
        AgentEvent::ToolCalled { .. } => None,
    }
}

/// Frame a turn's events as the full chunk sequence, without `[DONE]`.
pub fn completion_chunks<S>(
    builder: ChunkBuilder,
    events: S,
) -> impl Stream<Item = CompletionChunk> + Send
where
    S: Stream<Item = AgentEvent> + Send + 'static,
{
    let content = builder.clone();
    let body = events.filter_map(move |event| ready(event_text(event).map(|t| content.content(t))));

    stream::once(ready(builder.role()))
        .chain(body)
        .chain(stream::once(ready(builder.stop())))
}

/// SSE events for a turn, ending with the `[DONE]` sentinel.
pub fn sse_events<S>(
    builder: ChunkBuilder,
    events: S,
) -> impl Stream<Item = Result<Event, Infallible>> + Send
where
    S: Stream<Item = AgentEvent> + Send + 'static,
{
    completion_chunks(builder, events)
        .map(|chunk| serde_json::to_string(&chunk).unwrap_or_default())
        .chain(stream::once(ready(DONE.to_string())))
        .map(|data| Ok::<_, Infallible>(Event::default().data(data)))
}
