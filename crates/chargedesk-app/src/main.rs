//! ChargeDesk server binary - composition root.
//!
//! 1. Load `.env`, the TOML config, environment and CLI overrides
//! 2. Initialise tracing
//! 3. Build the LLM registry, the station backend, and the voice services
//! 4. Serve the API until Ctrl-C

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chargedesk_api::{routes, AppState};
use chargedesk_chat::ChatOrchestrator;
use chargedesk_llm::LlmRegistry;
use chargedesk_station::MockStationService;
use chargedesk_voice::{VoiceCallService, VoiceService};

use crate::cli::CliArgs;

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = args.load_config(|key| std::env::var(key).ok())?;

    init_tracing(&config.logging.level);
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        provider = %config.llm.provider,
        "Configuration loaded"
    );

    let llms = LlmRegistry::from_config(&config.llm)?;
    let providers: Vec<String> = llms.providers().iter().map(|p| p.to_string()).collect();
    tracing::info!(providers = ?providers, "LLM providers registered");

    let stations = Arc::new(MockStationService::new(config.station.clone()));

    let voice = VoiceService::from_config(&config.vapi)?;
    match (&voice, config.vapi.session_id.as_deref()) {
        (Some(_), Some(session_id)) => {
            tracing::info!(session_id, "Vapi voice integration enabled")
        }
        (Some(_), None) => tracing::warn!(
            "Vapi voice integration enabled without VAPI_SESSION_ID; \
             voice calls will each get a fresh session"
        ),
        (None, _) => tracing::info!("Vapi voice integration disabled (no private key)"),
    }

    let voice_calls = VoiceCallService::from_config(&config.vapi)?;
    if voice_calls.is_some() {
        tracing::info!("Browser voice calls enabled");
    } else {
        tracing::info!(
            "Browser voice calls disabled (needs VAPI_API_PUBLIC_KEY and VAPI_ASSISTANT_ID)"
        );
    }

    let orchestrator = ChatOrchestrator::new(&config, llms, stations);
    let state = AppState::new(config.clone(), orchestrator, voice).with_voice_calls(voice_calls);

    routes::start_server(&config, state, shutdown_signal()).await?;
    Ok(())
}
