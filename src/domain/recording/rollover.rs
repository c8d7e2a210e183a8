//! Rollover policy: segment splitting and storage pressure handling

use super::byte_size::ByteSize;

/// Per-session controller settings. Only changeable while idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Evict the oldest segment instead of stopping when the volume is full
    pub rolling: bool,
    /// Active segment size that triggers a rollover to a new segment
    pub segment_size: ByteSize,
    /// Record audio alongside video
    pub audio: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            rolling: true,
            segment_size: ByteSize::default_segment_size(),
            audio: false,
        }
    }
}

impl ControllerConfig {
    pub fn policy(&self) -> RolloverPolicy {
        RolloverPolicy::new(self.rolling, self.segment_size)
    }
}

/// Storage pressure response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAction {
    /// Delete the oldest segment to reclaim space
    EvictOldest,
    /// End the session with a final stop
    StopSession,
}

/// Actions decided for one status tick.
/// Both fields may be set on the same tick; storage is handled first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickPlan {
    pub storage: Option<StorageAction>,
    pub split_segment: bool,
}

/// Decides on every status tick whether to evict, stop or roll over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverPolicy {
    rolling: bool,
    segment_size: ByteSize,
}

impl RolloverPolicy {
    pub fn new(rolling: bool, segment_size: ByteSize) -> Self {
        Self {
            rolling,
            segment_size,
        }
    }

    /// Evaluate a status tick.
    ///
    /// # Arguments
    /// * `volume_full` - Storage monitor verdict for the active volume
    /// * `bytes_recorded` - Size of the active segment so far
    pub fn evaluate(&self, volume_full: bool, bytes_recorded: u64) -> TickPlan {
        let storage = match (volume_full, self.rolling) {
            (false, _) => None,
            (true, true) => Some(StorageAction::EvictOldest),
            (true, false) => Some(StorageAction::StopSession),
        };

        TickPlan {
            storage,
            split_segment: bytes_recorded > self.segment_size.as_bytes(),
        }
    }
}
