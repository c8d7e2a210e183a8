//! Serialized command/event loop around the controller
//!
//! User commands (from signals, the control socket or the terminal) and
//! recorder events arrive on separate channels. The loop is the single
//! owner of the controller and applies both one at a time.

use std::fmt;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::domain::recording::{CaptureState, StatusReport};

use super::controller::SegmentedRecordingController;
use super::ports::{OutputTargetProvider, Recorder, RecorderEvent, StatusSink, VolumeProbe};

/// Commands accepted by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Pause,
    Resume,
    /// Start, pause or resume depending on the state
    Toggle,
    /// Final stop of the session
    Stop,
    /// Final stop, then leave the loop once the segment is finalized
    Shutdown,
}

impl ControlCommand {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Toggle => "toggle",
            Self::Stop => "stop",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capacity of the command channel
pub const COMMAND_BUFFER: usize = 16;

/// Create the command channel feeding a [`ControlLoop`]
pub fn command_channel() -> (mpsc::Sender<ControlCommand>, mpsc::Receiver<ControlCommand>) {
    mpsc::channel(COMMAND_BUFFER)
}

/// Owns the controller and drives it from commands and recorder events.
pub struct ControlLoop<R, O, P, S>
where
    R: Recorder,
    O: OutputTargetProvider,
    P: VolumeProbe,
    S: StatusSink,
{
    controller: SegmentedRecordingController<R, O, P, S>,
    commands: mpsc::Receiver<ControlCommand>,
    events: mpsc::UnboundedReceiver<RecorderEvent>,
    status: watch::Sender<StatusReport>,
    shutting_down: bool,
    exit_when_idle: bool,
}

impl<R, O, P, S> ControlLoop<R, O, P, S>
where
    R: Recorder,
    O: OutputTargetProvider,
    P: VolumeProbe,
    S: StatusSink,
{
    /// Create the loop and a receiver for status snapshots.
    ///
    /// `events` must be the receiving end of the sender the controller was
    /// created with.
    pub fn new(
        controller: SegmentedRecordingController<R, O, P, S>,
        commands: mpsc::Receiver<ControlCommand>,
        events: mpsc::UnboundedReceiver<RecorderEvent>,
    ) -> (Self, watch::Receiver<StatusReport>) {
        let (status, status_rx) = watch::channel(controller.report());
        let control = Self {
            controller,
            commands,
            events,
            status,
            shutting_down: false,
            exit_when_idle: false,
        };
        (control, status_rx)
    }

    /// Also leave the loop once a session ran and settled on its own
    pub fn exit_when_idle(mut self) -> Self {
        self.exit_when_idle = true;
        self
    }

    pub fn controller(&self) -> &SegmentedRecordingController<R, O, P, S> {
        &self.controller
    }

    /// Run until shut down and the session is settled.
    ///
    /// A closed command channel counts as a shutdown request.
    pub async fn run(mut self) -> SegmentedRecordingController<R, O, P, S> {
        let mut commands_open = true;
        let mut was_active = self.controller.state() != CaptureState::Idle;

        loop {
            let done = self.shutting_down || (self.exit_when_idle && was_active);
            if done && self.controller.state() == CaptureState::Idle {
                break;
            }

            tokio::select! {
                command = self.commands.recv(), if commands_open => match command {
                    Some(command) => self.apply(command).await,
                    None => {
                        debug!("command channel closed");
                        commands_open = false;
                        self.apply(ControlCommand::Shutdown).await;
                    }
                },
                Some(event) = self.events.recv() => {
                    self.controller.handle_event(event).await;
                }
                else => break,
            }

            self.status.send_replace(self.controller.report());
            was_active |= self.controller.state() != CaptureState::Idle;
        }

        info!("control loop finished");
        self.controller
    }

    async fn apply(&mut self, command: ControlCommand) {
        debug!(%command, state = %self.controller.state(), "applying command");

        let result = match command {
            ControlCommand::Start => self.controller.start().await.map(|_| ()),
            ControlCommand::Pause => self.controller.pause().await,
            ControlCommand::Resume => self.controller.resume().await,
            ControlCommand::Toggle => self.controller.toggle().await,
            ControlCommand::Stop => self.controller.stop(true).await.map(|_| ()),
            ControlCommand::Shutdown => {
                self.shutting_down = true;
                if self.controller.state() == CaptureState::Idle {
                    Ok(())
                } else {
                    self.controller.stop(true).await.map(|_| ())
                }
            }
        };

        if let Err(e) = result {
            warn!(%command, error = %e, "command rejected");
            self.controller.publish_note(e.to_string());
        }
    }
}
