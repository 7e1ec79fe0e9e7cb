mod prompt_file;

pub use prompt_file::{PromptFileError, load_system_prompt};
