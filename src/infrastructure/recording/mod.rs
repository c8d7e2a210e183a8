//! Recording infrastructure module
//!
//! Records segments by running one FFmpeg process per segment.

mod ffmpeg;

pub use ffmpeg::{FfmpegRecorder, DEFAULT_STATUS_INTERVAL};
