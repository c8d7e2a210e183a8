//! Domain layer - Core business logic
//!
//! Contains value objects, entities, state machines and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod storage;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{
    ByteSize, CaptureState, ControllerConfig, Quality, RecordingSession, Segment, SegmentId,
    SegmentLedger, StatusReport,
};
pub use storage::VolumeRef;
