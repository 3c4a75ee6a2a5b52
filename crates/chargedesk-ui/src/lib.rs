//! ChargeDesk UI crate - embedded chat page.
//!
//! The page is a single self-contained HTML file with inline CSS and
//! JavaScript, embedded at compile time via `include_str!` and served by the
//! API at `/` and `/ui`.
//!
//! ```rust,ignore
//! use chargedesk_ui::chat::CHAT_HTML;
//!
//! async fn ui_handler() -> axum::response::Html<&'static str> {
//!     axum::response::Html(CHAT_HTML)
//! }
//! ```

pub mod chat;

pub use chat::CHAT_HTML;
