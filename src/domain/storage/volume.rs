//! Storage volume reference

use std::fmt;
use std::path::{Path, PathBuf};

/// Label of the volume used when none was chosen
pub const DEFAULT_VOLUME_LABEL: &str = "OnBoard";

/// Identifies the storage target that segments are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRef {
    label: String,
    root: PathBuf,
}

impl VolumeRef {
    /// A user-chosen volume
    pub fn new(label: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
        }
    }

    /// The default volume, identified by the directory recordings go to
    pub fn onboard(root: impl Into<PathBuf>) -> Self {
        Self::new(DEFAULT_VOLUME_LABEL, root)
    }

    /// A volume mounted at `root`, labelled after its last path component
    pub fn mounted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let label = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.to_string_lossy().to_string());
        Self { label, root }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Any path on the volume; used for free space queries
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_default(&self) -> bool {
        self.label == DEFAULT_VOLUME_LABEL
    }

    /// Reserved headroom for a volume of `total_bytes`:
    /// a tenth of the capacity, capped at `ceiling`.
    pub fn min_free_for_capacity(total_bytes: u64, ceiling: u64) -> u64 {
        (total_bytes / 10).min(ceiling)
    }
}

impl fmt::Display for VolumeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MEDIA : {}", self.label)
    }
}
