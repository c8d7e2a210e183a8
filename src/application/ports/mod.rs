//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod devices;
pub mod output;
pub mod recorder;
pub mod status;
pub mod storage;

// Re-export common types
pub use config::ConfigStore;
pub use devices::{CaptureDevice, DeviceCatalog, DeviceError};
pub use output::{OutputError, OutputTarget, OutputTargetProvider};
pub use recorder::{
    ActiveRecording, EventSender, Recorder, RecorderEvent, RecorderEventKind, RecordingError,
    RecordingId, RecordingStats, SegmentHandle,
};
pub use status::StatusSink;
pub use storage::VolumeProbe;
