//! CLI argument definitions for the ChargeDesk server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use chargedesk_core::{ChargeDeskConfig, ChargeDeskError, LlmProviderKind};

/// Config file used when neither `--config` nor `CHARGEDESK_CONFIG` is set.
pub const DEFAULT_CONFIG_FILE: &str = "chargedesk.toml";

/// ChargeDesk - EV charging station support chatbot server.
#[derive(Parser, Debug, Default)]
#[command(name = "chargedesk", version, about)]
pub struct CliArgs {
    /// Path to the TOML configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the API server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Default LLM provider (openai, ollama, together, groq, gemini).
    #[arg(long = "provider")]
    pub provider: Option<LlmProviderKind>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path and whether it was asked for
    /// explicitly.
    ///
    /// Priority: --config flag > CHARGEDESK_CONFIG > `chargedesk.toml`.
    pub fn resolve_config_path<F>(&self, lookup: F) -> (PathBuf, bool)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref p) = self.config {
            return (p.clone(), true);
        }
        if let Some(p) = lookup("CHARGEDESK_CONFIG").filter(|p| !p.trim().is_empty()) {
            return (PathBuf::from(p), true);
        }
        (PathBuf::from(DEFAULT_CONFIG_FILE), false)
    }

    /// Apply flag overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut ChargeDeskConfig) {
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }

    /// Build the effective configuration: file, then environment, then flags.
    ///
    /// An explicitly named config file must exist; the default one may not.
    pub fn load_config<F>(&self, lookup: F) -> Result<ChargeDeskConfig, ChargeDeskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (path, explicit) = self.resolve_config_path(&lookup);
        let mut config = if explicit {
            ChargeDeskConfig::load(&path).map_err(|e| {
                ChargeDeskError::Config(format!("cannot load {}: {}", path.display(), e))
            })?
        } else {
            ChargeDeskConfig::load_or_default(&path)
        };

        config.apply_env_overrides(&lookup)?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "chargedesk",
            "--host",
            "127.0.0.1",
            "-p",
            "9000",
            "--provider",
            "Groq",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.provider, Some(LlmProviderKind::Groq));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unknown_provider_flag_is_rejected() {
        assert!(CliArgs::try_parse_from(["chargedesk", "--provider", "claude"]).is_err());
    }

    #[test]
    fn test_config_path_priority() {
        let args = CliArgs::default();
        assert_eq!(
            args.resolve_config_path(env(&[])),
            (PathBuf::from(DEFAULT_CONFIG_FILE), false)
        );
        assert_eq!(
            args.resolve_config_path(env(&[("CHARGEDESK_CONFIG", "/etc/cd.toml")])),
            (PathBuf::from("/etc/cd.toml"), true)
        );

        let args = CliArgs {
            config: Some(PathBuf::from("local.toml")),
            ..CliArgs::default()
        };
        assert_eq!(
            args.resolve_config_path(env(&[("CHARGEDESK_CONFIG", "/etc/cd.toml")])),
            (PathBuf::from("local.toml"), true)
        );
    }

    #[test]
    fn test_flags_beat_env_beat_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chargedesk.toml");
        std::fs::write(
            &path,
            "[server]\nport = 7000\nhost = \"10.0.0.1\"\n\n[llm]\nprovider = \"ollama\"\n",
        )
        .unwrap();

        let args = CliArgs {
            config: Some(path.clone()),
            ..CliArgs::default()
        };
        let config = args.load_config(env(&[("PORT", "7100")])).unwrap();
        assert_eq!(config.server.port, 7100);
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.llm.provider, LlmProviderKind::Ollama);

        let args = CliArgs {
            config: Some(path),
            port: Some(7200),
            provider: Some(LlmProviderKind::Gemini),
            ..CliArgs::default()
        };
        let config = args.load_config(env(&[("PORT", "7100")])).unwrap();
        assert_eq!(config.server.port, 7200);
        assert_eq!(config.llm.provider, LlmProviderKind::Gemini);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs {
            config: Some(dir.path().join("missing.toml")),
            ..CliArgs::default()
        };
        let err = args.load_config(env(&[])).unwrap_err();
        assert!(matches!(err, ChargeDeskError::Config(_)));
    }

    #[test]
    fn test_invalid_config_fails_validation() {
        let args = CliArgs {
            port: Some(0),
            ..CliArgs::default()
        };
        assert!(args.load_config(env(&[])).is_err());
    }

    #[test]
    fn test_zero_rate_limit_is_rejected_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chargedesk.toml");
        std::fs::write(&path, "[server]\nrate_limit_per_sec = 0\n").unwrap();
        let args = CliArgs {
            config: Some(path),
            ..CliArgs::default()
        };
        let err = args.load_config(env(&[])).unwrap_err();
        assert!(matches!(err, ChargeDeskError::Config(_)));
        assert!(err.to_string().contains("rate_limit_per_sec"));
    }
}
