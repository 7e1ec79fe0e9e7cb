use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::presentation::error::{ApiError, NOT_READY};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct SystemPromptResponse {
    pub default_prompt: String,
}

pub async fn system_prompt_handler(
    State(state): State<AppState>,
) -> Result<Json<SystemPromptResponse>, ApiError> {
    let service = state
        .service
        .get()
        .ok_or_else(|| ApiError::ServiceUnavailable(NOT_READY.to_string()))?;

    Ok(Json(SystemPromptResponse {
        default_prompt: service.default_system_prompt().to_string(),
    }))
}
