use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub whisper_model: String,
    pub llm_model: String,
    pub llm_base_url: String,
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let settings = &state.settings;
    Json(StatusResponse {
        status: if state.service.is_ready() {
            "ready"
        } else {
            "initializing"
        },
        whisper_model: settings.whisper.model.clone(),
        llm_model: settings.llm.model.clone(),
        llm_base_url: settings.llm.base_url.clone(),
    })
}
