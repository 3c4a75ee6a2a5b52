//! Router setup with all API routes and middleware.

use std::future::Future;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use chargedesk_core::{ChargeDeskConfig, ChargeDeskError};

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
///
/// Chat, voice and station routes share one per-second rate limiter sized
/// from `server.rate_limit_per_sec`; health and the UI are exempt.
pub fn create_router(state: AppState) -> Router {
    // Vapi and browser tabs on any origin call in.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(handlers::SESSION_ID_HEADER)]);

    let public_routes = Router::new()
        .route("/", get(handlers::ui))
        .route("/ui", get(handlers::ui))
        .route("/health", get(handlers::health));

    let limiter = RateLimiter::new(state.config.server.rate_limit_per_sec);

    let chat_routes = Router::new()
        .route("/chat/completions", post(handlers::chat_completions))
        .route("/chat/load_assistants", post(handlers::load_assistants))
        .route(
            "/chat/create_new_assistant",
            post(handlers::create_new_assistant),
        )
        .route("/chat/voice_call", get(handlers::voice_call_status))
        .route("/chat/voice_call/start", post(handlers::start_voice_call))
        .route("/chat/voice_call/stop", post(handlers::stop_voice_call))
        .route("/chat/sessions", get(handlers::list_sessions))
        .route(
            "/chat/sessions/{id}/messages",
            get(handlers::session_messages),
        )
        .route("/chat/sessions/{id}", delete(handlers::delete_session))
        .route("/stations", get(handlers::list_stations))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter));

    public_routes
        .merge(chat_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB global limit
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ChargeDeskConfig,
    state: AppState,
    shutdown: F,
) -> Result<(), ChargeDeskError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChargeDeskError::Api(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(address = %addr, "Starting API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ChargeDeskError::Api(format!("Server error: {}", e)))?;

    tracing::info!("API server stopped");
    Ok(())
}
