use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{LlmClient, TranscriptionEngine, TranscriptionError};
use crate::domain::SystemPrompt;
use crate::infrastructure::observability::redact_for_log;

pub struct TranscriptionService {
    engine: Arc<dyn TranscriptionEngine>,
    llm_client: Arc<dyn LlmClient>,
    default_prompt: SystemPrompt,
}

impl TranscriptionService {
    pub fn new(
        engine: Arc<dyn TranscriptionEngine>,
        llm_client: Arc<dyn LlmClient>,
        default_prompt: SystemPrompt,
    ) -> Self {
        Self {
            engine,
            llm_client,
            default_prompt,
        }
    }

    pub async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        tracing::debug!(
            model = self.engine.model_name(),
            path = %audio_path.display(),
            "Transcribing audio"
        );

        let text = self.engine.transcribe(audio_path).await?;
        let text = text.trim().to_string();

        tracing::info!(chars = text.len(), raw = %redact_for_log(&text), "Transcription finished");

        Ok(text)
    }

    pub fn default_system_prompt(&self) -> &str {
        self.default_prompt.as_str()
    }

    /// Runs `text` through the LLM. Falls back to the raw text when the
    /// endpoint fails, so cleaning never surfaces an error to the caller.
    pub async fn clean(&self, text: &str, custom_prompt: Option<&str>) -> String {
        if text.is_empty() {
            return String::new();
        }

        let prompt = SystemPrompt::resolve(custom_prompt, &self.default_prompt);
        let custom = prompt != self.default_prompt;

        tracing::debug!(custom_prompt = custom, chars = text.len(), "Cleaning transcript with LLM");

        match self.llm_client.complete(prompt.as_str(), text).await {
            Ok(cleaned) => {
                let cleaned = cleaned.trim().to_string();
                tracing::info!(
                    chars = cleaned.len(),
                    cleaned = %redact_for_log(&cleaned),
                    "Transcript cleaned"
                );
                cleaned
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM cleaning failed, returning raw transcript");
                text.to_string()
            }
        }
    }

    /// Probes the chat-completion endpoint. Failures are logged, not returned.
    pub async fn check_llm_connectivity(&self) -> bool {
        match self.llm_client.list_models().await {
            Ok(models) => {
                tracing::info!(models = models.len(), "Connected to LLM API");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not connect to LLM, make sure the server is running");
                false
            }
        }
    }
}
