use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Serialize;

use crate::domain::AudioFileName;
use crate::infrastructure::upload::StagedAudio;
use crate::presentation::error::{ApiError, NOT_READY_MODELS};
use crate::presentation::state::AppState;

pub const AUDIO_FIELD: &str = "audio";

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    pub text: String,
}

/// Accepts `multipart/form-data` with the recording in the `audio` field.
#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let service = state.service.get().ok_or_else(|| {
        tracing::warn!("Transcription requested before models finished loading");
        ApiError::ServiceUnavailable(NOT_READY_MODELS.to_string())
    })?;

    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected transcription request");
        ApiError::BadRequest(rejection.body_text())
    })?;

    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = AudioFileName::new(field.file_name());
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file", e))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| {
        tracing::warn!("Transcription request without audio field");
        ApiError::UnprocessableEntity(format!("Field required: {}", AUDIO_FIELD))
    })?;

    tracing::debug!(filename = %file_name, bytes = data.len(), "Audio upload received");

    let staged = StagedAudio::stage(data, &file_name.suffix())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to stage upload");
            ApiError::Internal(format!("Transcription failed: {}", e))
        })?;

    let result = service.transcribe(staged.path()).await;
    staged.discard();

    match result {
        Ok(text) => Ok(Json(TranscribeResponse {
            success: true,
            text,
        })),
        Err(e) => {
            tracing::error!(error = %e, "Transcription error");
            Err(ApiError::Internal(format!("Transcription failed: {}", e)))
        }
    }
}

fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    tracing::error!(error = %e, "{}", context);
    let detail = format!("{}: {}", context, e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(detail)
    } else {
        ApiError::BadRequest(detail)
    }
}
