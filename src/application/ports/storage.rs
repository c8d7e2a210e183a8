//! Volume probing port interface

use std::io;
use std::path::Path;
use std::sync::Arc;

/// Port for querying the capacity of the volume holding a path
pub trait VolumeProbe: Send + Sync {
    /// Bytes available to this process on the volume
    fn usable_space(&self, path: &Path) -> io::Result<u64>;

    /// Total capacity of the volume
    fn total_space(&self, path: &Path) -> io::Result<u64>;
}

impl<P: VolumeProbe + ?Sized> VolumeProbe for Arc<P> {
    fn usable_space(&self, path: &Path) -> io::Result<u64> {
        self.as_ref().usable_space(path)
    }

    fn total_space(&self, path: &Path) -> io::Result<u64> {
        self.as_ref().total_space(path)
    }
}
