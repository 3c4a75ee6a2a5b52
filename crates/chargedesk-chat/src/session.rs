//! In-memory chat session store.
//!
//! Sessions are keyed by the caller-supplied session id and live for the
//! lifetime of the process. Besides the transcript, each session carries the
//! reboot counter that backs the per-session reboot cap.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use chargedesk_core::{ChatMessage, ChatSession};

use crate::error::ChatError;

/// Lightweight view of a session for listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSessionSummary {
    pub session_id: String,
    pub user_id: String,
    pub created_at: String,
    pub message_count: usize,
    pub reboot_count: u32,
}

#[derive(Default)]
pub struct ChatService {
    sessions: Mutex<HashMap<String, ChatSession>>,
}

impl ChatService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, ChatSession>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::StorageError(format!("session lock poisoned: {}", e)))
    }

    /// Start a fresh session, replacing any previous one with the same id.
    pub fn create_session(&self, user_id: &str, session_id: &str) -> Result<ChatSession, ChatError> {
        let session = ChatSession::new(session_id, user_id);
        self.lock()?.insert(session_id.to_string(), session.clone());
        info!(session_id, user_id, "Session created");
        Ok(session)
    }

    pub fn get_session(&self, session_id: &str) -> Result<Option<ChatSession>, ChatError> {
        Ok(self.lock()?.get(session_id).cloned())
    }

    pub fn contains(&self, session_id: &str) -> Result<bool, ChatError> {
        Ok(self.lock()?.contains_key(session_id))
    }

    /// Append to the transcript. Returns `false` for unknown sessions.
    pub fn add_message(&self, session_id: &str, message: ChatMessage) -> Result<bool, ChatError> {
        match self.lock()?.get_mut(session_id) {
            Some(session) => {
                session.messages.push(message);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reboots used in the current window; `0` for unknown sessions.
    pub fn get_reboot_count(&self, session_id: &str) -> Result<u32, ChatError> {
        Ok(self
            .lock()?
            .get(session_id)
            .map(|s| s.reboot_count)
            .unwrap_or(0))
    }

    /// Count one reboot and stamp its time.
    pub fn increment_reboot_count(&self, session_id: &str) -> Result<bool, ChatError> {
        match self.lock()?.get_mut(session_id) {
            Some(session) => {
                session.reboot_count += 1;
                session.last_reboot_time = Some(Utc::now());
                debug!(session_id, reboot_count = session.reboot_count, "Reboot counted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn reset_reboot_count(&self, session_id: &str) -> Result<bool, ChatError> {
        match self.lock()?.get_mut(session_id) {
            Some(session) => {
                session.reboot_count = 0;
                session.last_reboot_time = None;
                debug!(session_id, "Reboot count reset");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether the session's last reboot is older than `window_secs`.
    ///
    /// `false` for unknown sessions and sessions that never rebooted.
    pub fn should_reset_reboot_count(
        &self,
        session_id: &str,
        window_secs: u64,
    ) -> Result<bool, ChatError> {
        self.should_reset_reboot_count_at(session_id, window_secs, Utc::now())
    }

    pub fn should_reset_reboot_count_at(
        &self,
        session_id: &str,
        window_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<bool, ChatError> {
        let sessions = self.lock()?;
        let Some(last) = sessions.get(session_id).and_then(|s| s.last_reboot_time) else {
            return Ok(false);
        };
        // A window too large for chrono never elapses.
        let Some(window) = i64::try_from(window_secs).ok().and_then(Duration::try_seconds) else {
            return Ok(false);
        };
        Ok(now - last > window)
    }

    /// Transcript of a session, `None` if it does not exist.
    pub fn history(&self, session_id: &str) -> Result<Option<Vec<ChatMessage>>, ChatError> {
        Ok(self.lock()?.get(session_id).map(|s| s.messages.clone()))
    }

    /// Summaries of every session, newest first.
    pub fn list_sessions(&self) -> Result<Vec<ChatSessionSummary>, ChatError> {
        let sessions = self.lock()?;
        let mut summaries: Vec<(DateTime<Utc>, ChatSessionSummary)> = sessions
            .values()
            .map(|s| {
                (
                    s.created_at,
                    ChatSessionSummary {
                        session_id: s.session_id.clone(),
                        user_id: s.user_id.clone(),
                        created_at: s.created_at.to_rfc3339(),
                        message_count: s.messages.len(),
                        reboot_count: s.reboot_count,
                    },
                )
            })
            .collect();
        summaries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(summaries.into_iter().map(|(_, summary)| summary).collect())
    }

    pub fn delete_session(&self, session_id: &str) -> Result<bool, ChatError> {
        let removed = self.lock()?.remove(session_id).is_some();
        if removed {
            info!(session_id, "Session deleted");
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
