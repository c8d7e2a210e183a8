//! Output targets in a local directory tree

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::fs;
use tracing::debug;

use crate::application::ports::{OutputError, OutputTarget, OutputTargetProvider};

/// Subdirectory of the output tree holding the segments
pub const SEGMENT_DIR_NAME: &str = "cctv";

/// File name prefix of every segment
pub const SEGMENT_PREFIX: &str = "cctv-recording-";

const SEGMENT_EXTENSION: &str = "mp4";

/// Creates one timestamped MP4 file per segment under `<root>/cctv`
#[derive(Debug, Clone)]
pub struct DirectoryOutputProvider {
    dir: PathBuf,
}

impl DirectoryOutputProvider {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(SEGMENT_DIR_NAME),
        }
    }

    /// Segment file name for a given start time
    pub fn file_name(at: DateTime<Local>) -> String {
        format!(
            "{}{}.{}",
            SEGMENT_PREFIX,
            at.format("%Y%m%d-%H:%M:%S%.3f"),
            SEGMENT_EXTENSION
        )
    }

    /// Pick a path that does not exist yet
    async fn unique_path(&self, at: DateTime<Local>) -> PathBuf {
        let base = Self::file_name(at);
        let mut candidate = self.dir.join(&base);
        let mut n = 1;
        while fs::try_exists(&candidate).await.unwrap_or(false) {
            let stem = base.trim_end_matches(&format!(".{}", SEGMENT_EXTENSION));
            candidate = self
                .dir
                .join(format!("{}-{}.{}", stem, n, SEGMENT_EXTENSION));
            n += 1;
        }
        candidate
    }
}

#[async_trait]
impl OutputTargetProvider for DirectoryOutputProvider {
    async fn next_target(&self) -> Result<OutputTarget, OutputError> {
        // The output root must exist; only the segment directory is created
        match fs::create_dir(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(OutputError::CreateDirFailed {
                    path: self.dir.display().to_string(),
                    message: e.to_string(),
                })
            }
        }

        let path = self.unique_path(Local::now()).await;
        debug!(path = %path.display(), "next output target");
        Ok(OutputTarget::new(path))
    }

    async fn release(&self, path: &Path) -> Result<(), OutputError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            // Already gone
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OutputError::ReleaseFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn location(&self) -> PathBuf {
        self.dir.clone()
    }
}
