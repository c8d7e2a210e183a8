//! Recording segment entity

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Identifier of a segment, unique within one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(u64);

impl SegmentId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One continuous output unit produced during a recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    id: SegmentId,
    path: PathBuf,
    bytes_recorded: u64,
    created_at: DateTime<Local>,
}

impl Segment {
    pub fn new(id: SegmentId, path: impl Into<PathBuf>) -> Self {
        Self::with_created_at(id, path, Local::now())
    }

    pub fn with_created_at(
        id: SegmentId,
        path: impl Into<PathBuf>,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            path: path.into(),
            bytes_recorded: 0,
            created_at,
        }
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Backing file of the segment
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_recorded(&self) -> u64 {
        self.bytes_recorded
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Record the latest size reported by the recorder
    pub fn set_bytes_recorded(&mut self, bytes: u64) {
        self.bytes_recorded = bytes;
    }
}
