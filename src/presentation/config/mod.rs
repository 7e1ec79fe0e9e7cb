mod environment;
mod loader;
mod settings;

pub use environment::Environment;
pub use loader::{default_builder, load_settings, with_legacy_overrides};
pub use settings::{
    CorsSettings, LlmSettings, LoggingSettings, PromptSettings, ServerSettings, Settings,
    UploadSettings, WhisperSettings,
};
