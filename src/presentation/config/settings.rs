use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub whisper: WhisperSettings,
    pub llm: LlmSettings,
    pub prompt: PromptSettings,
    pub cors: CorsSettings,
    pub upload: UploadSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhisperSettings {
    /// Short size name (`base.en`) or a full Hugging Face repository id.
    pub model: String,
    pub language: Option<String>,
    /// `cpu` or `auto`.
    pub device: String,
}

impl WhisperSettings {
    pub fn language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub filter: Option<String>,
    pub json: bool,
}
