//! Output target port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Output errors
#[derive(Debug, Clone, Error)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {message}")]
    CreateDirFailed { path: String, message: String },

    #[error("Failed to release segment {path}: {message}")]
    ReleaseFailed { path: String, message: String },
}

/// A writable destination for one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
}

impl OutputTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Port providing one output target per segment.
/// Owns all filesystem concerns of the produced segments.
#[async_trait]
pub trait OutputTargetProvider: Send + Sync {
    /// Create a new writable target for the next segment.
    async fn next_target(&self) -> Result<OutputTarget, OutputError>;

    /// Release the storage backing a segment (delete its file).
    async fn release(&self, path: &Path) -> Result<(), OutputError>;

    /// Where segments end up, for status reports.
    fn location(&self) -> PathBuf;
}
