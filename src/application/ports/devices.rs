//! Capture device enumeration port interface

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Device enumeration errors
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("No capture device found")]
    NoDevice,

    #[error("Failed to enumerate capture devices: {0}")]
    EnumerationFailed(String),
}

/// A camera the recorder can bind to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    /// Human-readable name
    pub name: String,
    /// Device path or identifier passed to the recorder
    pub path: String,
    /// ffmpeg input format (v4l2, avfoundation, ...)
    pub input_format: String,
}

impl fmt::Display for CaptureDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}

/// Port for one-time camera enumeration
#[async_trait]
pub trait DeviceCatalog: Send + Sync {
    /// List available capture devices, in a stable order.
    async fn enumerate(&self) -> Result<Vec<CaptureDevice>, DeviceError>;
}
