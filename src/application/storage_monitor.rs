//! Storage monitor: reserved headroom checks on the recording volume

use tracing::warn;

use crate::domain::storage::VolumeRef;

use super::ports::VolumeProbe;

/// Answers whether the active volume dropped below its reserved headroom.
///
/// Probe failures are reported as a full volume so that recording stops or
/// evicts instead of filling an unreachable disk.
#[derive(Debug, Clone)]
pub struct StorageMonitor<P: VolumeProbe> {
    probe: P,
}

impl<P: VolumeProbe> StorageMonitor<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    /// True iff usable space is strictly below `min_free_bytes`.
    pub fn is_volume_full(&self, volume: &VolumeRef, min_free_bytes: u64) -> bool {
        match self.probe.usable_space(volume.root()) {
            Ok(usable) => usable < min_free_bytes,
            Err(e) => {
                warn!(volume = %volume.root().display(), error = %e, "volume unreachable, treating as full");
                true
            }
        }
    }

    /// Reserved headroom for `volume`: a tenth of its capacity, capped at
    /// `ceiling`. Falls back to `ceiling` if the capacity is unknown.
    pub fn compute_min_free_bytes(&self, volume: &VolumeRef, ceiling: u64) -> u64 {
        match self.probe.total_space(volume.root()) {
            Ok(total) => VolumeRef::min_free_for_capacity(total, ceiling),
            Err(e) => {
                warn!(volume = %volume.root().display(), error = %e, "cannot read volume capacity");
                ceiling
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    struct FixedProbe {
        usable: io::Result<u64>,
        total: io::Result<u64>,
    }

    impl FixedProbe {
        fn new(usable: u64, total: u64) -> Self {
            Self {
                usable: Ok(usable),
                total: Ok(total),
            }
        }

        fn unreachable() -> Self {
            Self {
                usable: Err(io::Error::new(io::ErrorKind::NotFound, "gone")),
                total: Err(io::Error::new(io::ErrorKind::NotFound, "gone")),
            }
        }
    }

    impl VolumeProbe for FixedProbe {
        fn usable_space(&self, _path: &Path) -> io::Result<u64> {
            match &self.usable {
                Ok(v) => Ok(*v),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }

        fn total_space(&self, _path: &Path) -> io::Result<u64> {
            match &self.total {
                Ok(v) => Ok(*v),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn volume() -> VolumeRef {
        VolumeRef::onboard("/data")
    }

    #[test]
    fn full_only_when_strictly_below() {
        let monitor = StorageMonitor::new(FixedProbe::new(1000, 10_000));
        assert!(!monitor.is_volume_full(&volume(), 1000));
        assert!(monitor.is_volume_full(&volume(), 1001));
    }

    #[test]
    fn unreachable_volume_is_full() {
        let monitor = StorageMonitor::new(FixedProbe::unreachable());
        assert!(monitor.is_volume_full(&volume(), 0));
    }

    #[test]
    fn min_free_is_tenth_capped() {
        let monitor = StorageMonitor::new(FixedProbe::new(0, 5_000));
        assert_eq!(monitor.compute_min_free_bytes(&volume(), 10_000), 500);
        assert_eq!(monitor.compute_min_free_bytes(&volume(), 100), 100);
    }

    #[test]
    fn min_free_unknown_capacity_uses_ceiling() {
        let monitor = StorageMonitor::new(FixedProbe::unreachable());
        assert_eq!(monitor.compute_min_free_bytes(&volume(), 4096), 4096);
    }
}
