//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like FFmpeg, V4L2 and the filesystem.

pub mod config;
pub mod devices;
pub mod recording;
pub mod storage;

// Re-export adapters
pub use config::XdgConfigStore;
pub use devices::{ConfiguredDevice, V4l2DeviceCatalog};
pub use recording::FfmpegRecorder;
pub use storage::{DirectoryOutputProvider, StatvfsProbe};
