//! Recorder port interface

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::devices::CaptureDevice;
use super::output::OutputTarget;
use crate::domain::recording::Quality;

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("FFmpeg not found. Please install ffmpeg.")]
    FfmpegNotFound,

    #[error("Failed to bind capture device: {0}")]
    BindFailed(String),

    #[error("Recorder is not bound to a capture device")]
    NotBound,

    #[error("Failed to prepare segment: {0}")]
    PrepareFailed(String),

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording command failed: {0}")]
    CommandFailed(String),

    #[error("Unknown recording: {0}")]
    UnknownRecording(RecordingId),
}

/// Identifier the recorder assigns to each started recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordingId(u64);

impl RecordingId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec-{}", self.0)
    }
}

/// Output prepared for a segment but not yet recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHandle {
    pub path: PathBuf,
}

/// A recording in progress, as returned by [`Recorder::start`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRecording {
    pub id: RecordingId,
    pub path: PathBuf,
}

/// Progress of one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingStats {
    pub bytes_recorded: u64,
    /// Recorded time, excluding pauses
    pub duration: Duration,
}

/// Events emitted by a recorder
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEventKind {
    Status(RecordingStats),
    Start,
    Pause,
    Resume,
    Finalize {
        stats: RecordingStats,
        output: PathBuf,
        error: Option<String>,
    },
}

impl RecorderEventKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Finalize { .. } => "finalize",
        }
    }
}

/// An event tagged with the recording it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderEvent {
    pub recording: RecordingId,
    pub kind: RecorderEventKind,
}

impl RecorderEvent {
    pub fn new(recording: RecordingId, kind: RecorderEventKind) -> Self {
        Self { recording, kind }
    }
}

/// Channel recorders deliver their events on.
/// Events may be sent from any task; the receiver applies them in order.
pub type EventSender = mpsc::UnboundedSender<RecorderEvent>;

/// Port for segment recording.
///
/// Commands return once the recorder accepted them; their effect is
/// confirmed asynchronously through [`RecorderEvent`]s.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Bind the recorder to a capture device at the given quality.
    async fn bind(&self, device: &CaptureDevice, quality: Quality) -> Result<(), RecordingError>;

    /// Prepare a segment writing to `target`.
    async fn prepare_segment(&self, target: &OutputTarget) -> Result<SegmentHandle, RecordingError>;

    /// Start recording a prepared segment.
    ///
    /// # Arguments
    /// * `handle` - The prepared segment
    /// * `audio` - Whether to capture audio
    /// * `events` - Where to deliver events for this recording
    async fn start(
        &self,
        handle: SegmentHandle,
        audio: bool,
        events: EventSender,
    ) -> Result<ActiveRecording, RecordingError>;

    async fn pause(&self, recording: &ActiveRecording) -> Result<(), RecordingError>;

    async fn resume(&self, recording: &ActiveRecording) -> Result<(), RecordingError>;

    /// Ask the recorder to stop; a `Finalize` event follows.
    async fn stop(&self, recording: &ActiveRecording) -> Result<(), RecordingError>;
}
