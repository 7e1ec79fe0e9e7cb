use std::fmt;

/// Instruction text sent as the `system` message when cleaning a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt(String);

impl SystemPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Picks the per-request prompt when one was supplied, otherwise the default.
    /// An empty custom prompt counts as not supplied.
    pub fn resolve(custom: Option<&str>, default: &SystemPrompt) -> SystemPrompt {
        match custom {
            Some(text) if !text.is_empty() => SystemPrompt::new(text),
            _ => default.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
