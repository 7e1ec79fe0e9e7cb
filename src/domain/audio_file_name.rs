use std::fmt;
use std::path::Path;

const DEFAULT_SUFFIX: &str = ".webm";

/// Client-supplied name of an uploaded audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFileName(Option<String>);

impl AudioFileName {
    pub fn new(name: Option<&str>) -> Self {
        Self(name.map(str::to_string).filter(|n| !n.is_empty()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    /// Temp-file suffix for this upload, dot included. Browser recordings
    /// arrive without a usable name, so those fall back to `.webm`.
    pub fn suffix(&self) -> String {
        self.0
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string())
    }
}

impl fmt::Display for AudioFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
