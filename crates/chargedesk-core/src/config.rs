use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ChargeDeskError, Result};
use crate::types::LlmProviderKind;

/// Top-level configuration for the ChargeDesk service.
///
/// Loaded from a TOML file (optional), then overridden by environment
/// variables, then by CLI flags in the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeDeskConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub vapi: VapiConfig,
}

impl ChargeDeskConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ChargeDeskConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ChargeDeskError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Empty values are ignored so that `OPENAI_API_KEY=` in a `.env` file
    /// does not register a provider with a blank key.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ChargeDeskError::Config(format!("invalid PORT '{}'", port)))?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(provider) = get("LLM_PROVIDER") {
            self.llm.provider = provider.parse().map_err(ChargeDeskError::Config)?;
        }

        for kind in LlmProviderKind::ALL {
            let prefix = kind.as_str().to_ascii_uppercase();
            let section = self.llm.section_mut(kind);
            if let Some(key) = get(&format!("{}_API_KEY", prefix)) {
                section.api_key = Some(key);
            }
            if let Some(model) = get(&format!("{}_MODEL", prefix)) {
                section.model = Some(model);
            }
            if let Some(url) = get(&format!("{}_BASE_URL", prefix)) {
                section.base_url = Some(url);
            }
        }

        let vapi = &mut self.vapi;
        for (key, slot) in [
            ("VAPI_SESSION_ID", &mut vapi.session_id),
            ("VAPI_API_PUBLIC_KEY", &mut vapi.api_public_key),
            ("VAPI_API_PRIVATE_KEY", &mut vapi.api_private_key),
            ("VAPI_ASSISTANT_NAME", &mut vapi.assistant_name),
            ("VAPI_ASSISTANT_ID", &mut vapi.assistant_id),
            ("VAPI_CUSTOM_LLM_URL", &mut vapi.custom_llm_url),
        ] {
            if let Some(value) = get(key) {
                *slot = Some(value);
            }
        }

        Ok(())
    }

    /// Reject configurations the services cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ChargeDeskError::Config("server.port must be non-zero".into()));
        }
        if self.server.rate_limit_per_sec == 0 {
            return Err(ChargeDeskError::Config(
                "server.rate_limit_per_sec must be at least 1".into(),
            ));
        }
        if self.session.reboot_limit == 0 {
            return Err(ChargeDeskError::Config(
                "session.reboot_limit must be at least 1".into(),
            ));
        }
        for (name, rate) in [
            ("station.reboot_success_rate", self.station.reboot_success_rate),
            ("station.status_drift_rate", self.station.status_drift_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ChargeDeskError::Config(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, rate
                )));
            }
        }
        for (name, [min, max]) in [
            ("station.check_delay_ms", self.station.check_delay_ms),
            ("station.reboot_delay_ms", self.station.reboot_delay_ms),
        ] {
            if min > max {
                return Err(ChargeDeskError::Config(format!(
                    "{} range is inverted: [{}, {}]",
                    name, min, max
                )));
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ChargeDeskError::Config(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second accepted on the chat routes.
    pub rate_limit_per_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            rate_limit_per_sec: 100,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// LLM provider selection and per-provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider used when a request does not name one.
    pub provider: LlmProviderKind,
    pub temperature: f32,
    /// Upper bound on model/tool round trips within one user turn.
    pub max_tool_rounds: usize,
    /// Retries for transient provider failures (network, 429, 5xx).
    pub max_retries: u32,
    pub request_timeout_secs: u64,
    pub openai: ProviderSection,
    pub ollama: ProviderSection,
    pub together: ProviderSection,
    pub groq: ProviderSection,
    pub gemini: ProviderSection,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::Openai,
            temperature: 0.7,
            max_tool_rounds: 8,
            max_retries: 2,
            request_timeout_secs: 60,
            openai: ProviderSection::default(),
            ollama: ProviderSection::default(),
            together: ProviderSection::default(),
            groq: ProviderSection::default(),
            gemini: ProviderSection::default(),
        }
    }
}

impl LlmConfig {
    pub fn section(&self, kind: LlmProviderKind) -> &ProviderSection {
        match kind {
            LlmProviderKind::Openai => &self.openai,
            LlmProviderKind::Ollama => &self.ollama,
            LlmProviderKind::Together => &self.together,
            LlmProviderKind::Groq => &self.groq,
            LlmProviderKind::Gemini => &self.gemini,
        }
    }

    pub fn section_mut(&mut self, kind: LlmProviderKind) -> &mut ProviderSection {
        match kind {
            LlmProviderKind::Openai => &mut self.openai,
            LlmProviderKind::Ollama => &mut self.ollama,
            LlmProviderKind::Together => &mut self.together,
            LlmProviderKind::Groq => &mut self.groq,
            LlmProviderKind::Gemini => &mut self.gemini,
        }
    }

    /// Resolve a provider's settings, filling unset fields with that
    /// provider's defaults.
    ///
    /// Returns `None` for providers that require an API key and have none.
    /// Ollama runs locally and is always available.
    pub fn resolve(&self, kind: LlmProviderKind) -> Option<ResolvedProvider> {
        let section = self.section(kind);
        let (base_url, model) = match kind {
            LlmProviderKind::Openai => ("https://api.openai.com/v1", "gpt-3.5-turbo"),
            LlmProviderKind::Ollama => ("http://localhost:11434/v1", "llama3"),
            LlmProviderKind::Together => {
                ("https://api.together.xyz/v1", "meta-llama/Llama-2-7b-chat-hf")
            }
            LlmProviderKind::Groq => ("https://api.groq.com/openai/v1", "llama3-8b-8192"),
            LlmProviderKind::Gemini => (
                "https://generativelanguage.googleapis.com/v1beta/openai",
                "gemini-pro",
            ),
        };

        let api_key = section.api_key.clone().filter(|k| !k.is_empty());
        if api_key.is_none() && kind != LlmProviderKind::Ollama {
            return None;
        }

        Some(ResolvedProvider {
            kind,
            base_url: section.base_url.clone().unwrap_or_else(|| base_url.to_string()),
            model: section.model.clone().unwrap_or_else(|| model.to_string()),
            api_key,
            temperature: self.temperature,
            max_retries: self.max_retries,
            request_timeout_secs: self.request_timeout_secs,
        })
    }
}

/// Per-provider overrides. Unset fields fall back to the provider's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Fully resolved connection settings for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProvider {
    pub kind: LlmProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reboots allowed per session inside one window.
    pub reboot_limit: u32,
    /// Length of the reboot rate-limit window in seconds.
    pub reboot_window_secs: u64,
    /// User id recorded when a request does not carry one.
    pub default_user_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reboot_limit: 3,
            reboot_window_secs: 300,
            default_user_id: "VAPI".to_string(),
        }
    }
}

/// Station simulator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Stations known at startup.
    pub seed_station_ids: Vec<String>,
    /// Simulated latency of a status check, `[min, max]` in milliseconds.
    pub check_delay_ms: [u64; 2],
    /// Simulated latency of a reboot, `[min, max]` in milliseconds.
    pub reboot_delay_ms: [u64; 2],
    /// Probability that a reboot of an online station succeeds.
    pub reboot_success_rate: f64,
    /// Probability that a status check re-rolls the connector status.
    pub status_drift_rate: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            seed_station_ids: (1..=5).map(|n| format!("ST{:03}", n)).collect(),
            check_delay_ms: [500, 2000],
            reboot_delay_ms: [2000, 5000],
            reboot_success_rate: 0.9,
            status_drift_rate: 0.1,
        }
    }
}

/// Vapi voice platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VapiConfig {
    pub base_url: String,
    /// Session id Vapi sends on every call; requests carrying it are
    /// trimmed to their last user message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    /// Public URL of this service's `/chat/completions`, handed to Vapi.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_llm_url: Option<String>,
}

impl Default for VapiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.vapi.ai".to_string(),
            session_id: None,
            api_public_key: None,
            api_private_key: None,
            assistant_name: None,
            assistant_id: None,
            custom_llm_url: None,
        }
    }
}
