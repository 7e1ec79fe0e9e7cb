mod clean;
mod status;
mod system_prompt;
mod transcribe;

pub use clean::{CleanRequest, CleanResponse, clean_handler};
pub use status::{StatusResponse, status_handler};
pub use system_prompt::{SystemPromptResponse, system_prompt_handler};
pub use transcribe::{AUDIO_FIELD, TranscribeResponse, transcribe_handler};
