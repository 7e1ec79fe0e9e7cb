use std::path::Path;

use async_trait::async_trait;

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribes the audio file at `audio_path` into plain text.
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
}
