use std::sync::Arc;

use crate::presentation::config::Settings;

use super::ServiceSlot;

#[derive(Clone)]
pub struct AppState {
    pub service: ServiceSlot,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(service: ServiceSlot, settings: Settings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }
}
