//! ChargeDesk API crate - axum HTTP server, route handlers, SSE streaming.
//!
//! Serves the OpenAI-compatible `/chat/completions` endpoint used by both the
//! browser chat UI and the Vapi voice assistant, plus voice assistant
//! management, session inspection, and health checks.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod stream;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
