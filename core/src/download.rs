//! Where downloaded files end up.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ApiError;

/// The "save as" step of a download.
pub trait DownloadSink: Send + Sync {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), ApiError>;
}

/// Writes every download into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Only the final path component of `filename` is used.
    fn target(&self, filename: &str) -> Result<PathBuf, ApiError> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| ApiError::Storage(format!("invalid file name: {filename:?}")))?;
        Ok(self.dir.join(name))
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), ApiError> {
        let target = self.target(filename)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&target, bytes)?;
        debug!(path = %target.display(), len = bytes.len(), "saved download");
        Ok(())
    }
}
