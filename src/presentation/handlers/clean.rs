use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::presentation::error::{ApiError, NOT_READY};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct CleanRequest {
    pub text: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Serialize)]
pub struct CleanResponse {
    pub success: bool,
    pub text: String,
}

#[tracing::instrument(skip(state, request), fields(chars = request.text.len()))]
pub async fn clean_handler(
    State(state): State<AppState>,
    Json(request): Json<CleanRequest>,
) -> Result<Json<CleanResponse>, ApiError> {
    let service = state
        .service
        .get()
        .ok_or_else(|| ApiError::ServiceUnavailable(NOT_READY.to_string()))?;

    let text = service
        .clean(&request.text, request.system_prompt.as_deref())
        .await;

    Ok(Json(CleanResponse {
        success: true,
        text,
    }))
}
