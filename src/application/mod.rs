//! Application layer - Use cases and port interfaces
//!
//! Contains the recording controller, its driving loop and the trait
//! definitions for external system interactions.

pub mod control_loop;
pub mod controller;
pub mod ports;
pub mod storage_monitor;

pub use control_loop::{command_channel, ControlCommand, ControlLoop};
pub use controller::{ControllerError, SegmentedRecordingController};
pub use storage_monitor::StorageMonitor;
