//! Tool-calling agent bound to one chat session.
//!
//! Each turn alternates between a model call and tool execution until the
//! model answers without requesting tools. The conversation thread lives in
//! the agent so follow-up turns see the earlier tool results.

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::Mutex;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};

use chargedesk_core::{ChatMessage, LlmProviderKind, MessageRole};
use chargedesk_llm::{LlmClient, LlmMessage, LlmRequest};

use crate::error::ChatError;
use crate::prompt::ensure_system_prompt;
use crate::session::ChatService;
use crate::tools::{ToolContext, ToolRegistry};

/// Something the client should see while a turn runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    /// "Please wait" text pushed by a tool before a slow operation.
    Intermediate(String),
    /// Text from a model reply.
    Assistant(String),
    ToolCalled { name: String },
    Error(String),
}

pub struct ChatbotAgent {
    session_id: String,
    user_id: String,
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    sessions: Arc<ChatService>,
    max_tool_rounds: usize,
    /// Model-facing thread. Held for the whole turn so turns of one session
    /// never interleave.
    thread: Mutex<Vec<LlmMessage>>,
}

impl ChatbotAgent {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
        sessions: Arc<ChatService>,
        max_tool_rounds: usize,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            llm,
            tools,
            sessions,
            max_tool_rounds,
            thread: Mutex::new(Vec::new()),
        }
    }

    /// Start the thread from a transcript the client already holds.
    ///
    /// Only user and assistant messages are kept. They are also recorded in
    /// the session so its history matches what the model sees.
    pub fn with_history(mut self, prior: Vec<ChatMessage>) -> Self {
        let kept: Vec<ChatMessage> = prior
            .into_iter()
            .filter(|m| matches!(m.role, MessageRole::User | MessageRole::Assistant))
            .filter(|m| !m.content.trim().is_empty())
            .collect();
        if kept.is_empty() {
            return self;
        }
        debug!(session_id = %self.session_id, messages = kept.len(), "Seeding thread");

        for message in &kept {
            self.record(message.clone());
        }
        self.thread
            .get_mut()
            .extend(kept.into_iter().map(|m| match m.role {
                MessageRole::User => LlmMessage::user(m.content),
                _ => LlmMessage::assistant(m.content),
            }));
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn provider(&self) -> LlmProviderKind {
        self.llm.provider()
    }

    /// Run one turn in the background and stream its events.
    ///
    /// The stream ends when the turn is complete.
    pub fn stream_message(self: Arc<Self>, message: String) -> UnboundedReceiverStream<AgentEvent> {
        let (tx, rx) = unbounded_channel();
        tokio::spawn(async move {
            self.run_turn(message, tx).await;
        });
        UnboundedReceiverStream::new(rx)
    }

    /// Run one turn, sending events to `events`. Failures are reported as
    /// [`AgentEvent::Error`] rather than returned.
    pub async fn run_turn(&self, message: String, events: UnboundedSender<AgentEvent>) {
        let mut thread = self.thread.lock().await;
        info!(
            session_id = %self.session_id,
            provider = %self.llm.provider(),
            "Processing user message"
        );

        self.record(ChatMessage::user(message.clone()));
        ensure_system_prompt(&mut thread);
        thread.push(LlmMessage::user(message));
        let checkpoint = thread.len();

        match self.drive(&mut thread, &events).await {
            Ok(Some(answer)) => self.record(ChatMessage::assistant(answer)),
            Ok(None) => debug!(session_id = %self.session_id, "Turn ended without text"),
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "Agent turn failed");
                // Drop half-finished tool exchanges so the next turn starts clean.
                thread.truncate(checkpoint);
                let _ = events.send(AgentEvent::Error(e.to_string()));
            }
        }
    }

    async fn drive(
        &self,
        thread: &mut Vec<LlmMessage>,
        events: &UnboundedSender<AgentEvent>,
    ) -> Result<Option<String>, ChatError> {
        let ctx = ToolContext::new(self.session_id.clone(), events.clone());
        let definitions = self.tools.definitions();
        let mut answer = None;
        let mut rounds = 0;

        loop {
            ensure_system_prompt(thread);
            let request = LlmRequest::new(thread.clone()).with_tools(definitions.clone());
            let response = self.llm.complete(&request).await?;
            debug!(
                session_id = %self.session_id,
                messages = thread.len(),
                tool_calls = response.tool_calls.len(),
                "Model replied"
            );

            let tool_calls = response.tool_calls.clone();
            if !response.content.trim().is_empty() {
                answer = Some(response.content.clone());
                let _ = events.send(AgentEvent::Assistant(response.content.clone()));
            }
            thread.push(response.into_message());

            if tool_calls.is_empty() {
                return Ok(answer);
            }
            if rounds >= self.max_tool_rounds {
                warn!(session_id = %self.session_id, rounds, "Tool round limit reached");
                return Err(ChatError::TooManyToolRounds(self.max_tool_rounds));
            }
            rounds += 1;

            for call in &tool_calls {
                let _ = events.send(AgentEvent::ToolCalled {
                    name: call.name.clone(),
                });
                let result = self.tools.execute(&ctx, call).await;
                thread.push(LlmMessage::tool_result(call.id.clone(), result.to_string()));
            }
        }
    }

    fn record(&self, message: ChatMessage) {
        match self.sessions.add_message(&self.session_id, message) {
            Ok(true) => {}
            Ok(false) => warn!(session_id = %self.session_id, "Session missing, message not recorded"),
            Err(e) => warn!(session_id = %self.session_id, error = %e, "Failed to record message"),
        }
    }
}
