//! rollcap - segmented CCTV-style recording with storage-aware rollover
//!
//! Records a camera into fixed-size segments. When the watched volume runs
//! short of its reserved headroom the oldest segment is deleted (rolling
//! mode) or the session is stopped.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Segment ledger, session state machine, rollover policy, config
//! - **Application**: The recording controller, its control loop and port traits
//! - **Infrastructure**: Adapter implementations (FFmpeg, statvfs, V4L2, XDG config)
//! - **CLI**: Command-line interface, argument parsing, signals and the daemon socket

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
