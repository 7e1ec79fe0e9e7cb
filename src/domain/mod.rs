mod audio_file_name;
mod system_prompt;
mod whisper_model_id;

pub use audio_file_name::AudioFileName;
pub use system_prompt::SystemPrompt;
pub use whisper_model_id::WhisperModelId;
