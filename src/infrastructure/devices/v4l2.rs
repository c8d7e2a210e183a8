//! Video4Linux camera enumeration

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::ports::{CaptureDevice, DeviceCatalog, DeviceError};

const DEV_DIR: &str = "/dev";
const SYSFS_DIR: &str = "/sys/class/video4linux";

/// Lists `/dev/videoN` capture nodes, named after their sysfs entry
#[derive(Debug, Clone)]
pub struct V4l2DeviceCatalog {
    dev_dir: PathBuf,
    sysfs_dir: PathBuf,
    input_format: String,
}

impl V4l2DeviceCatalog {
    pub fn new(input_format: impl Into<String>) -> Self {
        Self::with_roots(DEV_DIR, SYSFS_DIR, input_format)
    }

    /// Create with custom device and sysfs directories
    pub fn with_roots(
        dev_dir: impl Into<PathBuf>,
        sysfs_dir: impl Into<PathBuf>,
        input_format: impl Into<String>,
    ) -> Self {
        Self {
            dev_dir: dev_dir.into(),
            sysfs_dir: sysfs_dir.into(),
            input_format: input_format.into(),
        }
    }

    /// `video3` -> 3
    fn node_number(name: &str) -> Option<u32> {
        name.strip_prefix("video")?.parse().ok()
    }

    async fn read_attr(&self, node: &str, attr: &str) -> Option<String> {
        fs::read_to_string(self.sysfs_dir.join(node).join(attr))
            .await
            .ok()
            .map(|s| s.trim().to_string())
    }

    /// Metadata nodes share the device name but have a non-zero index
    async fn is_capture_node(&self, node: &str) -> bool {
        match self.read_attr(node, "index").await {
            Some(index) => index == "0",
            None => true,
        }
    }

    async fn describe(&self, node: &str, path: &Path) -> CaptureDevice {
        let name = self
            .read_attr(node, "name")
            .await
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| node.to_string());

        CaptureDevice {
            name,
            path: path.to_string_lossy().to_string(),
            input_format: self.input_format.clone(),
        }
    }
}

#[async_trait]
impl DeviceCatalog for V4l2DeviceCatalog {
    async fn enumerate(&self) -> Result<Vec<CaptureDevice>, DeviceError> {
        let mut entries = fs::read_dir(&self.dev_dir)
            .await
            .map_err(|e| DeviceError::EnumerationFailed(e.to_string()))?;

        let mut nodes = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DeviceError::EnumerationFailed(e.to_string()))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(number) = Self::node_number(&name) {
                nodes.push((number, name, entry.path()));
            }
        }
        nodes.sort_by_key(|(number, _, _)| *number);

        let mut devices = Vec::with_capacity(nodes.len());
        for (_, node, path) in nodes {
            if !self.is_capture_node(&node).await {
                debug!(node = %node, "skipping metadata node");
                continue;
            }
            devices.push(self.describe(&node, &path).await);
        }

        if devices.is_empty() {
            return Err(DeviceError::NoDevice);
        }
        Ok(devices)
    }
}

/// A single device given explicitly in the configuration
#[derive(Debug, Clone)]
pub struct ConfiguredDevice {
    device: CaptureDevice,
}

impl ConfiguredDevice {
    pub fn new(path: impl Into<String>, input_format: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            device: CaptureDevice {
                name: path.clone(),
                path,
                input_format: input_format.into(),
            },
        }
    }
}

#[async_trait]
impl DeviceCatalog for ConfiguredDevice {
    async fn enumerate(&self) -> Result<Vec<CaptureDevice>, DeviceError> {
        Ok(vec![self.device.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_node(dev: &Path, sys: &Path, node: &str, name: Option<&str>, index: Option<&str>) {
        std::fs::write(dev.join(node), b"").unwrap();
        let attrs = sys.join(node);
        std::fs::create_dir_all(&attrs).unwrap();
        if let Some(name) = name {
            std::fs::write(attrs.join("name"), format!("{}\n", name)).unwrap();
        }
        if let Some(index) = index {
            std::fs::write(attrs.join("index"), format!("{}\n", index)).unwrap();
        }
    }

    #[test]
    fn node_numbers() {
        assert_eq!(V4l2DeviceCatalog::node_number("video0"), Some(0));
        assert_eq!(V4l2DeviceCatalog::node_number("video12"), Some(12));
        assert_eq!(V4l2DeviceCatalog::node_number("videofoo"), None);
        assert_eq!(V4l2DeviceCatalog::node_number("vbi0"), None);
    }

    #[tokio::test]
    async fn enumerates_in_numeric_order_and_skips_metadata() {
        let dev = TempDir::new().unwrap();
        let sys = TempDir::new().unwrap();
        fake_node(dev.path(), sys.path(), "video10", Some("USB Cam"), Some("0"));
        fake_node(dev.path(), sys.path(), "video0", Some("Integrated Camera"), Some("0"));
        fake_node(dev.path(), sys.path(), "video1", Some("Integrated Camera"), Some("1"));
        std::fs::write(dev.path().join("null"), b"").unwrap();

        let catalog = V4l2DeviceCatalog::with_roots(dev.path(), sys.path(), "v4l2");
        let devices = catalog.enumerate().await.unwrap();

        let names: Vec<_> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Integrated Camera", "USB Cam"]);
        assert!(devices[0].path.ends_with("video0"));
        assert_eq!(devices[0].input_format, "v4l2");
    }

    #[tokio::test]
    async fn missing_sysfs_name_falls_back_to_node() {
        let dev = TempDir::new().unwrap();
        let sys = TempDir::new().unwrap();
        fake_node(dev.path(), sys.path(), "video4", None, None);

        let catalog = V4l2DeviceCatalog::with_roots(dev.path(), sys.path(), "v4l2");
        let devices = catalog.enumerate().await.unwrap();
        assert_eq!(devices[0].name, "video4");
    }

    #[tokio::test]
    async fn no_nodes_is_no_device() {
        let dev = TempDir::new().unwrap();
        let sys = TempDir::new().unwrap();
        let catalog = V4l2DeviceCatalog::with_roots(dev.path(), sys.path(), "v4l2");
        assert!(matches!(
            catalog.enumerate().await,
            Err(DeviceError::NoDevice)
        ));
    }

    #[tokio::test]
    async fn configured_device_is_the_only_one() {
        let catalog = ConfiguredDevice::new("/dev/video7", "v4l2");
        let devices = catalog.enumerate().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].path, "/dev/video7");
    }
}
