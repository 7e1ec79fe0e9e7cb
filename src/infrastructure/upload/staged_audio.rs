use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = "transcribe-";

/// An uploaded audio file written to the temp directory. The file is removed
/// when this value is dropped or discarded, whichever comes first.
#[derive(Debug)]
pub struct StagedAudio {
    file: NamedTempFile,
}

impl StagedAudio {
    /// Writes `data` to a fresh temp file named with `suffix` (dot included),
    /// so decoders can probe the container from the extension.
    pub async fn stage<D>(data: D, suffix: &str) -> io::Result<Self>
    where
        D: AsRef<[u8]> + Send + 'static,
    {
        let suffix = suffix.to_string();
        let file = tokio::task::spawn_blocking(move || -> io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .suffix(&suffix)
                .tempfile()?;
            file.write_all(data.as_ref())?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(io::Error::other)??;

        tracing::debug!(path = %file.path().display(), "Staged upload");

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
        }
    }
}
