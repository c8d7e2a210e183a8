//! Recording session state machine

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    #[default]
    Idle,
    Recording,
    Paused,
    Finalizing,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Finalizing => "finalizing",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The recorder should be told to start a segment
    Started,
    /// A stop is still outstanding; nothing to do
    Ignored,
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The recorder should be told to stop
    Issued,
    /// A stop is already in flight; no second command
    AlreadyStopping,
}

/// What to do once the recorder reports a finalized segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Start the next segment of the same session
    Continue,
    /// The session is over
    Settled,
}

/// Recording session entity.
///
/// State machine:
///   IDLE -> RECORDING (begin / start)
///   RECORDING <-> PAUSED (pause / resume)
///   RECORDING | PAUSED -> FINALIZING (request_stop)
///   FINALIZING -> IDLE (finalized)
///
/// `stop_outstanding` is set when a stop command is issued and cleared only
/// when the recorder confirms the segment is finalized. While it is set,
/// start requests are ignored. `continuation` decides whether a finalized
/// segment is followed by the next one.
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: CaptureState,
    cumulative: Duration,
    continuation: bool,
    stop_outstanding: bool,
}

impl RecordingSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    pub fn is_paused(&self) -> bool {
        self.state == CaptureState::Paused
    }

    pub fn is_finalizing(&self) -> bool {
        self.state == CaptureState::Finalizing
    }

    /// Recorded duration of every finished segment of this session
    pub fn cumulative_duration(&self) -> Duration {
        self.cumulative
    }

    /// Whether a finalized segment triggers the next one
    pub fn continues(&self) -> bool {
        self.continuation
    }

    pub fn stop_outstanding(&self) -> bool {
        self.stop_outstanding
    }

    /// User-initiated start of a new session.
    /// Resets the aggregates, then starts the first segment.
    pub fn begin(&mut self) -> Result<StartOutcome, InvalidStateTransition> {
        if self.stop_outstanding {
            return Ok(StartOutcome::Ignored);
        }
        self.check_startable("start recording")?;

        self.cumulative = Duration::ZERO;
        self.continuation = true;
        self.start()
    }

    /// Start a segment, keeping the session aggregates.
    pub fn start(&mut self) -> Result<StartOutcome, InvalidStateTransition> {
        if self.stop_outstanding {
            return Ok(StartOutcome::Ignored);
        }
        self.check_startable("start segment")?;

        self.state = CaptureState::Recording;
        Ok(StartOutcome::Started)
    }

    /// Transition from RECORDING to PAUSED
    pub fn pause(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Recording {
            return Err(self.invalid("pause recording"));
        }
        self.state = CaptureState::Paused;
        Ok(())
    }

    /// Transition from PAUSED to RECORDING
    pub fn resume(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Paused {
            return Err(self.invalid("resume recording"));
        }
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Request a stop of the active segment.
    ///
    /// A final stop ends the session: continuation is cleared even when a
    /// rollover stop is already in flight.
    pub fn request_stop(&mut self, is_final: bool) -> Result<StopOutcome, InvalidStateTransition> {
        match self.state {
            CaptureState::Recording | CaptureState::Paused => {
                self.state = CaptureState::Finalizing;
                self.stop_outstanding = true;
                if is_final {
                    self.continuation = false;
                }
                Ok(StopOutcome::Issued)
            }
            CaptureState::Finalizing => {
                if is_final {
                    self.continuation = false;
                }
                Ok(StopOutcome::AlreadyStopping)
            }
            CaptureState::Idle => Err(self.invalid("stop recording")),
        }
    }

    /// The recorder finalized the active segment.
    ///
    /// `segment_duration` is added to the session total. A failed segment
    /// ends the session regardless of continuation.
    pub fn finalized(&mut self, segment_duration: Duration, failed: bool) -> FinalizeOutcome {
        self.stop_outstanding = false;
        self.cumulative += segment_duration;
        self.state = CaptureState::Idle;

        if self.continuation && !failed {
            FinalizeOutcome::Continue
        } else {
            self.continuation = false;
            FinalizeOutcome::Settled
        }
    }

    /// Abandon the session after the recorder refused to start
    pub fn abort(&mut self) {
        self.state = CaptureState::Idle;
        self.continuation = false;
        self.stop_outstanding = false;
    }

    fn check_startable(&self, action: &str) -> Result<(), InvalidStateTransition> {
        match self.state {
            CaptureState::Idle => Ok(()),
            CaptureState::Finalizing if !self.stop_outstanding => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }
}
