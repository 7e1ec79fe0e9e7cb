use std::sync::{Arc, OnceLock};

use crate::application::services::TranscriptionService;

/// Write-once holder for the service. Empty while models are loading.
#[derive(Clone, Default)]
pub struct ServiceSlot(Arc<OnceLock<Arc<TranscriptionService>>>);

impl ServiceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(service: TranscriptionService) -> Self {
        let slot = Self::new();
        slot.install(service);
        slot
    }

    /// Returns false when a service was already installed.
    pub fn install(&self, service: TranscriptionService) -> bool {
        self.0.set(Arc::new(service)).is_ok()
    }

    /// Installs the service, then probes the LLM endpoint. Requests are
    /// served while the probe is still waiting on a slow host.
    pub async fn activate(&self, service: TranscriptionService) -> bool {
        if !self.install(service) {
            return false;
        }
        if let Some(service) = self.get() {
            service.check_llm_connectivity().await;
        }
        true
    }

    pub fn get(&self) -> Option<Arc<TranscriptionService>> {
        self.0.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.0.get().is_some()
    }
}
