use std::path::Path;

use crate::domain::SystemPrompt;

#[derive(Debug, thiserror::Error)]
pub enum PromptFileError {
    #[error("cannot read prompt file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("prompt file {0} is empty")]
    Empty(String),
}

/// Reads the default cleanup prompt, trimming surrounding whitespace.
pub fn load_system_prompt(path: &Path) -> Result<SystemPrompt, PromptFileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PromptFileError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err(PromptFileError::Empty(path.display().to_string()));
    }

    tracing::debug!(path = %path.display(), chars = trimmed.len(), "Loaded system prompt");

    Ok(SystemPrompt::new(trimmed))
}
