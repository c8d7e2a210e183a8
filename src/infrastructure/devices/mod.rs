//! Capture device enumeration adapters

mod v4l2;

pub use v4l2::{ConfiguredDevice, V4l2DeviceCatalog};
