//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::{ByteSize, ControllerConfig, Quality};
use crate::domain::storage::VolumeRef;

/// Name of the output directory used when none is configured
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "rollcap";

/// Default ffmpeg input format for the current platform
#[cfg(target_os = "macos")]
pub const DEFAULT_INPUT_FORMAT: &str = "avfoundation";
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_INPUT_FORMAT: &str = "v4l2";

/// Capture device configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Explicit device (e.g. /dev/video2); overrides `camera`
    pub device: Option<String>,
    /// Index into the enumerated devices
    pub camera: Option<usize>,
    pub quality: Option<String>,
    pub input_format: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub output_dir: Option<String>,
    pub volume: Option<String>,
    pub min_free: Option<String>,
    pub segment_size: Option<String>,
    pub rolling: Option<bool>,
    pub audio: Option<bool>,
    pub capture: Option<CaptureConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            output_dir: None,
            volume: None,
            min_free: None,
            segment_size: Some(ByteSize::default_segment_size().to_string()),
            rolling: Some(true),
            audio: Some(false),
            capture: Some(CaptureConfig {
                device: None,
                camera: Some(0),
                quality: Some(Quality::default().to_string()),
                input_format: Some(DEFAULT_INPUT_FORMAT.to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output_dir: other.output_dir.or(self.output_dir),
            volume: other.volume.or(self.volume),
            min_free: other.min_free.or(self.min_free),
            segment_size: other.segment_size.or(self.segment_size),
            rolling: other.rolling.or(self.rolling),
            audio: other.audio.or(self.audio),
            capture: Self::merge_capture_config(self.capture, other.capture),
        }
    }

    fn merge_capture_config(
        base: Option<CaptureConfig>,
        other: Option<CaptureConfig>,
    ) -> Option<CaptureConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CaptureConfig {
                device: o.device.or(b.device),
                camera: o.camera.or(b.camera),
                quality: o.quality.or(b.quality),
                input_format: o.input_format.or(b.input_format),
            }),
        }
    }

    /// Output tree, or the platform video directory if not set
    pub fn output_dir_or_default(&self) -> PathBuf {
        match self.output_dir {
            Some(ref dir) => PathBuf::from(dir),
            None => dirs::video_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_OUTPUT_DIR_NAME),
        }
    }

    /// Where segment files go: the output directory, or the chosen volume
    /// when only a volume is configured
    pub fn output_root(&self) -> PathBuf {
        match (&self.output_dir, &self.volume) {
            (None, Some(volume)) => PathBuf::from(volume),
            _ => self.output_dir_or_default(),
        }
    }

    /// The chosen volume, or the default volume holding the output tree
    pub fn volume_or_default(&self) -> VolumeRef {
        match self.volume {
            Some(ref root) => VolumeRef::mounted_at(root),
            None => VolumeRef::onboard(self.output_dir_or_default()),
        }
    }

    /// Configured reserved headroom; `None` means derive it from the volume
    pub fn min_free(&self) -> Option<ByteSize> {
        self.min_free.as_ref().and_then(|s| s.parse().ok())
    }

    pub fn segment_size_or_default(&self) -> ByteSize {
        self.segment_size
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(ByteSize::default_segment_size)
    }

    /// Get rolling setting, or true if not set
    pub fn rolling_or_default(&self) -> bool {
        self.rolling.unwrap_or(true)
    }

    /// Get audio setting, or false if not set
    pub fn audio_or_default(&self) -> bool {
        self.audio.unwrap_or(false)
    }

    pub fn device(&self) -> Option<&str> {
        self.capture.as_ref().and_then(|c| c.device.as_deref())
    }

    pub fn camera_or_default(&self) -> usize {
        self.capture.as_ref().and_then(|c| c.camera).unwrap_or(0)
    }

    pub fn quality_or_default(&self) -> Quality {
        self.capture
            .as_ref()
            .and_then(|c| c.quality.as_ref())
            .and_then(|q| q.parse().ok())
            .unwrap_or_default()
    }

    pub fn input_format_or_default(&self) -> &str {
        self.capture
            .as_ref()
            .and_then(|c| c.input_format.as_deref())
            .unwrap_or(DEFAULT_INPUT_FORMAT)
    }

    /// Per-session controller settings derived from this config
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            rolling: self.rolling_or_default(),
            segment_size: self.segment_size_or_default(),
            audio: self.audio_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.output_dir.is_none());
        assert!(config.min_free.is_none());
        assert_eq!(config.segment_size, Some("1G".to_string()));
        assert_eq!(config.rolling, Some(true));
        assert_eq!(config.audio, Some(false));
        assert_eq!(config.camera_or_default(), 0);
        assert_eq!(config.quality_or_default(), Quality::Fhd);
        assert_eq!(config.input_format_or_default(), DEFAULT_INPUT_FORMAT);
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.output_dir.is_none());
        assert!(config.segment_size.is_none());
        assert!(config.rolling.is_none());
        assert!(config.capture.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            output_dir: Some("/base".to_string()),
            segment_size: Some("1G".to_string()),
            rolling: Some(true),
            ..Default::default()
        };
        let other = AppConfig {
            output_dir: Some("/other".to_string()),
            segment_size: None,
            rolling: Some(false),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.output_dir, Some("/other".to_string()));
        assert_eq!(merged.segment_size, Some("1G".to_string()));
        assert_eq!(merged.rolling, Some(false));
    }

    #[test]
    fn merge_capture_config_fieldwise() {
        let base = AppConfig {
            capture: Some(CaptureConfig {
                device: Some("/dev/video0".to_string()),
                quality: Some("hd".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let other = AppConfig {
            capture: Some(CaptureConfig {
                quality: Some("sd".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.device(), Some("/dev/video0"));
        assert_eq!(merged.quality_or_default(), Quality::Sd);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = AppConfig {
            segment_size: Some("huge".to_string()),
            min_free: Some("lots".to_string()),
            capture: Some(CaptureConfig {
                quality: Some("8k".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.segment_size_or_default(), ByteSize::default_segment_size());
        assert!(config.min_free().is_none());
        assert_eq!(config.quality_or_default(), Quality::Fhd);
    }

    #[test]
    fn volume_defaults_to_output_dir() {
        let config = AppConfig {
            output_dir: Some("/srv/cctv".to_string()),
            ..Default::default()
        };
        let volume = config.volume_or_default();
        assert!(volume.is_default());
        assert_eq!(volume.root(), std::path::Path::new("/srv/cctv"));
    }

    #[test]
    fn chosen_volume_is_labelled() {
        let config = AppConfig {
            volume: Some("/media/sdcard".to_string()),
            ..Default::default()
        };
        assert_eq!(config.volume_or_default().label(), "sdcard");
    }

    #[test]
    fn output_root_prefers_output_dir() {
        let volume_only = AppConfig {
            volume: Some("/media/usb".to_string()),
            ..Default::default()
        };
        assert_eq!(volume_only.output_root(), PathBuf::from("/media/usb"));

        let both = AppConfig {
            output_dir: Some("/media/usb/cam1".to_string()),
            volume: Some("/media/usb".to_string()),
            ..Default::default()
        };
        assert_eq!(both.output_root(), PathBuf::from("/media/usb/cam1"));
    }

    #[test]
    fn controller_config_from_app_config() {
        let config = AppConfig {
            segment_size: Some("512M".to_string()),
            rolling: Some(false),
            audio: Some(true),
            ..Default::default()
        };
        let controller = config.controller_config();
        assert!(!controller.rolling);
        assert!(controller.audio);
        assert_eq!(controller.segment_size, ByteSize::from_mib(512));
    }

    #[test]
    fn boolean_defaults() {
        let config = AppConfig::empty();
        assert!(config.rolling_or_default());
        assert!(!config.audio_or_default());
    }
}
