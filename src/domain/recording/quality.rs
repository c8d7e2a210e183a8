//! Video quality presets

use std::fmt;
use std::str::FromStr;

use crate::domain::error::QualityParseError;

/// Capture resolution presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    Uhd,
    #[default]
    Fhd,
    Hd,
    Sd,
}

impl Quality {
    /// All presets, highest first
    pub const ALL: [Quality; 4] = [Self::Uhd, Self::Fhd, Self::Hd, Self::Sd];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uhd => "uhd",
            Self::Fhd => "fhd",
            Self::Hd => "hd",
            Self::Sd => "sd",
        }
    }

    /// Frame dimensions (width, height)
    pub const fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Uhd => (3840, 2160),
            Self::Fhd => (1920, 1080),
            Self::Hd => (1280, 720),
            Self::Sd => (720, 480),
        }
    }

    /// Size string in the `WxH` form ffmpeg expects
    pub fn video_size(&self) -> String {
        let (w, h) = self.dimensions();
        format!("{}x{}", w, h)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Quality {
    type Err = QualityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uhd" | "2160p" | "4k" => Ok(Self::Uhd),
            "fhd" | "1080p" => Ok(Self::Fhd),
            "hd" | "720p" => Ok(Self::Hd),
            "sd" | "480p" => Ok(Self::Sd),
            _ => Err(QualityParseError { input: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_and_aliases() {
        assert_eq!("uhd".parse::<Quality>().unwrap(), Quality::Uhd);
        assert_eq!("1080p".parse::<Quality>().unwrap(), Quality::Fhd);
        assert_eq!(" HD ".parse::<Quality>().unwrap(), Quality::Hd);
        assert_eq!("480p".parse::<Quality>().unwrap(), Quality::Sd);
    }

    #[test]
    fn parse_invalid() {
        let err = "8k".parse::<Quality>().unwrap_err();
        assert!(err.to_string().contains("8k"));
    }

    #[test]
    fn video_size() {
        assert_eq!(Quality::Hd.video_size(), "1280x720");
        assert_eq!(Quality::default(), Quality::Fhd);
    }
}
