//! Volume probe backed by statvfs(2)

use std::io;
use std::path::Path;

use nix::sys::statvfs::{statvfs, Statvfs};

use crate::application::ports::VolumeProbe;

/// Reads free and total space of the filesystem holding a path
#[derive(Debug, Clone, Copy, Default)]
pub struct StatvfsProbe;

impl StatvfsProbe {
    pub fn new() -> Self {
        Self
    }

    /// Stats `path` itself. A missing volume root is an error, never the
    /// filesystem of its parent directory.
    fn stat(path: &Path) -> io::Result<Statvfs> {
        statvfs(path).map_err(io::Error::from)
    }
}

impl VolumeProbe for StatvfsProbe {
    fn usable_space(&self, path: &Path) -> io::Result<u64> {
        let stat = Self::stat(path)?;
        // Space available to unprivileged users
        Ok(stat.blocks_available() as u64 * stat.fragment_size() as u64)
    }

    fn total_space(&self, path: &Path) -> io::Result<u64> {
        let stat = Self::stat(path)?;
        Ok(stat.blocks() as u64 * stat.fragment_size() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::StorageMonitor;
    use crate::domain::storage::VolumeRef;
    use tempfile::TempDir;

    #[test]
    fn reports_space_of_temp_dir() {
        let dir = TempDir::new().unwrap();
        let probe = StatvfsProbe::new();

        let total = probe.total_space(dir.path()).unwrap();
        let usable = probe.usable_space(dir.path()).unwrap();
        assert!(total > 0);
        assert!(usable <= total);
    }

    #[test]
    fn missing_volume_root_is_not_found() {
        let dir = TempDir::new().unwrap();
        let probe = StatvfsProbe::new();

        let unplugged = dir.path().join("usb-unplugged");
        let err = probe.usable_space(&unplugged).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(probe.total_space(&unplugged).is_err());
    }

    #[test]
    fn removed_volume_root_reads_as_full() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("usb");
        std::fs::create_dir(&root).unwrap();
        let monitor = StorageMonitor::new(StatvfsProbe::new());
        let volume = VolumeRef::mounted_at(&root);

        assert!(!monitor.is_volume_full(&volume, 1));
        std::fs::remove_dir(&root).unwrap();
        assert!(monitor.is_volume_full(&volume, 1));
    }
}
