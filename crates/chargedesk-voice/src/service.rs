use std::sync::Arc;

use tracing::info;

use chargedesk_core::config::VapiConfig;

use crate::client::{AssistantDirectory, VapiClient};
use crate::error::VoiceError;
use crate::types::{AssistantResponse, CreateAssistantRequest, VapiAssistant};

/// Assistant management behind the chat UI's voice panel.
pub struct VoiceService {
    directory: Arc<dyn AssistantDirectory>,
    assistant_name: Option<String>,
    custom_llm_url: Option<String>,
}

fn configured(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

impl VoiceService {
    pub fn new(
        directory: Arc<dyn AssistantDirectory>,
        assistant_name: Option<String>,
        custom_llm_url: Option<String>,
    ) -> Self {
        Self {
            directory,
            assistant_name,
            custom_llm_url,
        }
    }

    /// Build the service from config; `None` when no private key is set.
    pub fn from_config(config: &VapiConfig) -> Result<Option<Self>, VoiceError> {
        let Some(key) = configured(&config.api_private_key) else {
            return Ok(None);
        };
        let client = VapiClient::new(config.base_url.clone(), &key)?;
        Ok(Some(Self::new(
            Arc::new(client),
            configured(&config.assistant_name),
            configured(&config.custom_llm_url),
        )))
    }

    pub async fn load_all_assistants(&self) -> Result<AssistantResponse, VoiceError> {
        let names = self.directory.list_assistants().await?;
        info!(count = names.len(), "Loaded Vapi assistants");
        Ok(AssistantResponse { names })
    }

    /// Return the configured assistant, creating it on first use.
    pub async fn create_new_assistant(&self) -> Result<VapiAssistant, VoiceError> {
        let name = self
            .assistant_name
            .as_deref()
            .ok_or_else(|| VoiceError::NotConfigured("VAPI_ASSISTANT_NAME is not set".into()))?;

        let existing = self.directory.list_assistants().await?;
        if let Some(found) = existing.into_iter().find(|a| a.name == name) {
            info!(assistant = name, id = %found.id, "Found existing assistant");
            return Ok(found);
        }

        let url = self
            .custom_llm_url
            .as_deref()
            .ok_or_else(|| VoiceError::NotConfigured("VAPI_CUSTOM_LLM_URL is not set".into()))?;
        info!(assistant = name, "Assistant not found, creating it");
        let created = self
            .directory
            .create_assistant(&CreateAssistantRequest::support_desk(name, url))
            .await?;
        info!(assistant = %created.name, id = %created.id, "Created assistant");
        Ok(created)
    }
}
