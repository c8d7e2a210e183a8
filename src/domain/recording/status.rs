//! Human-readable status reports

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::byte_size::MB;
use super::session::CaptureState;

/// Name of the last lifecycle event seen from the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StatusLabel {
    #[default]
    Idle,
    Started,
    Paused,
    Resumed,
    Finalized,
}

impl StatusLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Started => "Started",
            Self::Paused => "Paused",
            Self::Resumed => "Resumed",
            Self::Finalized => "Finalized",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot emitted to the status sink after every processed event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub label: StatusLabel,
    pub state: CaptureState,
    /// Session total: finished segments plus the active one
    pub elapsed: Duration,
    /// Bytes of the active segment
    pub bytes_recorded: u64,
    /// Number of segments currently kept for the session
    pub segments: usize,
    /// Bytes held by those segments
    pub stored_bytes: u64,
    /// Where the output went, set when a session settles
    pub saved_to: Option<PathBuf>,
    /// Extra information such as an error or storage warning
    pub note: Option<String>,
}

impl StatusReport {
    pub fn idle() -> Self {
        Self {
            label: StatusLabel::Idle,
            state: CaptureState::Idle,
            elapsed: Duration::ZERO,
            bytes_recorded: 0,
            segments: 0,
            stored_bytes: 0,
            saved_to: None,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whole mebibytes recorded in the active segment
    pub fn megabytes(&self) -> u64 {
        self.bytes_recorded / MB
    }

    /// Whole mebibytes kept across the session's segments
    pub fn stored_megabytes(&self) -> u64 {
        self.stored_bytes / MB
    }
}

impl Default for StatusReport {
    fn default() -> Self {
        Self::idle()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.as_secs();
        write!(
            f,
            "{}: recorded {}minute {}second({}MB)",
            self.label,
            secs / 60,
            secs % 60,
            self.megabytes()
        )?;

        if let Some(ref path) = self.saved_to {
            write!(f, "\nFile saved to: {}", path.display())?;
        }
        if let Some(ref note) = self.note {
            write!(f, "\n{}", note)?;
        }
        Ok(())
    }
}
