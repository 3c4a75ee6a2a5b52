//! Browser voice calls started from the chat UI.
//!
//! One call at a time per process. A call moves inactive -> loading -> active
//! and back to inactive when it is stopped or fails to start.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use chargedesk_core::config::VapiConfig;

use crate::client::{CallLauncher, VapiClient};
use crate::error::VoiceError;
use crate::types::{CallState, VoiceCallStatus, WebCall, WebCallRequest};

enum CallSlot {
    Inactive,
    Loading,
    Active(WebCall),
}

pub struct VoiceCallService {
    launcher: Arc<dyn CallLauncher>,
    assistant_id: String,
    slot: Mutex<CallSlot>,
}

impl VoiceCallService {
    pub fn new(launcher: Arc<dyn CallLauncher>, assistant_id: impl Into<String>) -> Self {
        Self {
            launcher,
            assistant_id: assistant_id.into(),
            slot: Mutex::new(CallSlot::Inactive),
        }
    }

    /// `None` unless both the public key and the assistant id are set.
    pub fn from_config(config: &VapiConfig) -> Result<Option<Self>, VoiceError> {
        let configured = |v: &Option<String>| v.clone().filter(|v| !v.trim().is_empty());
        let (Some(key), Some(assistant_id)) = (
            configured(&config.api_public_key),
            configured(&config.assistant_id),
        ) else {
            return Ok(None);
        };
        let client = VapiClient::new(config.base_url.clone(), &key)?;
        Ok(Some(Self::new(Arc::new(client), assistant_id)))
    }

    fn slot(&self) -> MutexGuard<'_, CallSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> VoiceCallStatus {
        match &*self.slot() {
            CallSlot::Inactive => VoiceCallStatus::inactive(),
            CallSlot::Loading => VoiceCallStatus {
                state: CallState::Loading,
                call_id: None,
                web_call_url: None,
            },
            CallSlot::Active(call) => active_status(call),
        }
    }

    /// Start a call with recording and interruptions disabled.
    pub async fn start(&self) -> Result<VoiceCallStatus, VoiceError> {
        {
            let mut slot = self.slot();
            match &*slot {
                CallSlot::Loading => {
                    return Err(VoiceError::CallBusy("a voice call is already starting".into()))
                }
                CallSlot::Active(_) => {
                    return Err(VoiceError::CallBusy("a voice call is already active".into()))
                }
                CallSlot::Inactive => {}
            }
            *slot = CallSlot::Loading;
        }
        info!(assistant_id = %self.assistant_id, "Initializing voice call");

        let request = WebCallRequest::support_call(self.assistant_id.clone());
        match self.launcher.start_web_call(&request).await {
            Ok(call) => {
                info!(call_id = %call.id, "Voice call active");
                let status = active_status(&call);
                *self.slot() = CallSlot::Active(call);
                Ok(status)
            }
            Err(e) => {
                warn!(error = %e, "Voice call initialization failed");
                *self.slot() = CallSlot::Inactive;
                Err(e)
            }
        }
    }

    /// Hang up the active call. Stopping with no call is a no-op.
    ///
    /// The call counts as ended even when Vapi rejects the hang-up; the
    /// browser leaving the room ends it as well.
    pub async fn stop(&self) -> Result<VoiceCallStatus, VoiceError> {
        let call = {
            let mut slot = self.slot();
            match std::mem::replace(&mut *slot, CallSlot::Inactive) {
                CallSlot::Active(call) => call,
                CallSlot::Inactive => return Ok(VoiceCallStatus::inactive()),
                CallSlot::Loading => {
                    *slot = CallSlot::Loading;
                    return Err(VoiceError::CallBusy("the voice call is still starting".into()));
                }
            }
        };

        info!(call_id = %call.id, "Ending voice call");
        if let Err(e) = self.launcher.end_call(&call).await {
            warn!(call_id = %call.id, error = %e, "Vapi did not confirm the hang-up");
        }
        Ok(VoiceCallStatus::inactive())
    }
}

fn active_status(call: &WebCall) -> VoiceCallStatus {
    VoiceCallStatus {
        state: CallState::Active,
        call_id: Some(call.id.clone()),
        web_call_url: Some(call.web_call_url.clone()),
    }
}
