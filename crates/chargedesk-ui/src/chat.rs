//! Support chat page.
//!
//! Talks to the API on the same origin: streams replies from
//! `/chat/completions`, reads available providers from `/health`, and drives
//! the Vapi assistant and voice call endpoints from the voice panel. Each browser tab gets
//! its own session id; switching provider starts a new session because an
//! existing session keeps the model it started with.

/// The complete self-contained chat page.
pub const CHAT_HTML: &str = include_str!("../assets/chat.html");
