use std::fmt;

const OPENAI_NAMESPACE: &str = "openai/whisper-";

/// Hugging Face repository holding a Whisper checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhisperModelId(String);

impl WhisperModelId {
    /// Accepts either a full repository id (`distil-whisper/distil-small.en`)
    /// or a short size name (`base.en`, `large-v3`).
    pub fn resolve(name: &str) -> Self {
        let name = name.trim();
        if name.contains('/') {
            Self(name.to_string())
        } else {
            Self(format!("{}{}", OPENAI_NAMESPACE, name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_english_only(&self) -> bool {
        self.0.ends_with(".en")
    }
}

impl fmt::Display for WhisperModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
