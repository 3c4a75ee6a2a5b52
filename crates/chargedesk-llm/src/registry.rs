use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use chargedesk_core::config::LlmConfig;
use chargedesk_core::LlmProviderKind;

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::openai::OpenAiCompatibleClient;

/// The set of usable LLM clients, keyed by provider.
///
/// Keys iterate in [`LlmProviderKind`] declaration order, which is also the
/// fallback order when the requested provider is missing.
#[derive(Clone, Default)]
pub struct LlmRegistry {
    clients: BTreeMap<LlmProviderKind, Arc<dyn LlmClient>>,
}

impl LlmRegistry {
    /// Register every provider the configuration can reach.
    ///
    /// Keyed providers are skipped without a key; Ollama is always registered.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut clients: BTreeMap<LlmProviderKind, Arc<dyn LlmClient>> = BTreeMap::new();
        for kind in LlmProviderKind::ALL {
            let Some(resolved) = config.resolve(kind) else {
                info!(provider = %kind, "Provider not configured, skipping");
                continue;
            };
            let client = OpenAiCompatibleClient::new(resolved)?;
            info!(provider = %kind, model = client.model(), "Registered LLM provider");
            clients.insert(kind, Arc::new(client));
        }
        Ok(Self { clients })
    }

    pub fn from_clients(clients: Vec<Arc<dyn LlmClient>>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|client| (client.provider(), client))
                .collect(),
        }
    }

    /// The requested provider, or the first registered one with a warning.
    pub fn get(&self, requested: LlmProviderKind) -> Result<Arc<dyn LlmClient>, LlmError> {
        if let Some(client) = self.clients.get(&requested) {
            return Ok(Arc::clone(client));
        }
        let (fallback, client) = self.clients.iter().next().ok_or(LlmError::NoProviders)?;
        warn!(
            requested = %requested,
            fallback = %fallback,
            "Requested LLM provider unavailable, falling back"
        );
        Ok(Arc::clone(client))
    }

    pub fn providers(&self) -> Vec<LlmProviderKind> {
        self.clients.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
