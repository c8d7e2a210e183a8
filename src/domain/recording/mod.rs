//! Recording domain: segments, the session state machine and rollover rules

mod byte_size;
mod ledger;
mod quality;
mod rollover;
mod segment;
mod session;
mod status;

pub use byte_size::{
    ByteSize, DEFAULT_MIN_FREE, DEFAULT_SEGMENT_SIZE, GB, MB, MIN_FREE_CEILING,
};
pub use ledger::SegmentLedger;
pub use quality::Quality;
pub use rollover::{ControllerConfig, RolloverPolicy, StorageAction, TickPlan};
pub use segment::{Segment, SegmentId};
pub use session::{
    CaptureState, FinalizeOutcome, InvalidStateTransition, RecordingSession, StartOutcome,
    StopOutcome,
};
pub use status::{StatusLabel, StatusReport};
