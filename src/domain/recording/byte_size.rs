//! Byte size value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::ByteSizeParseError;

/// One mebibyte, the unit used in status reports
pub const MB: u64 = 1024 * 1024;

/// One gibibyte
pub const GB: u64 = 1024 * MB;

/// Default segment size before an automatic rollover (1 GiB)
pub const DEFAULT_SEGMENT_SIZE: u64 = 0x4000_0000;

/// Default reserved headroom on the recording volume (1 GiB)
pub const DEFAULT_MIN_FREE: u64 = GB;

/// Upper bound for a computed reserved headroom (1 GiB)
pub const MIN_FREE_CEILING: u64 = GB;

/// Value object representing a number of bytes.
/// Parses human-friendly strings with binary suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteSize {
    bytes: u64,
}

impl ByteSize {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub const fn from_mib(mib: u64) -> Self {
        Self { bytes: mib * MB }
    }

    pub const fn from_gib(gib: u64) -> Self {
        Self { bytes: gib * GB }
    }

    /// Default segment rollover threshold
    pub const fn default_segment_size() -> Self {
        Self::from_bytes(DEFAULT_SEGMENT_SIZE)
    }

    /// Default reserved free space
    pub const fn default_min_free() -> Self {
        Self::from_bytes(DEFAULT_MIN_FREE)
    }

    pub const fn as_bytes(&self) -> u64 {
        self.bytes
    }

    /// Whole mebibytes, rounded down
    pub const fn as_mib(&self) -> u64 {
        self.bytes / MB
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        Self::from_bytes(bytes)
    }
}

impl FromStr for ByteSize {
    type Err = ByteSizeParseError;

    /// Parse a size string into a ByteSize value object.
    /// Supported formats: "1048576", "512K", "512M", "1G", "2T", "1GiB", "1gb"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ByteSizeParseError { input: s.to_string() };
        let input = s.trim().to_lowercase();

        let split = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        let (number, suffix) = input.split_at(split);

        if number.is_empty() {
            return Err(err());
        }

        let value: u64 = number.parse().map_err(|_| err())?;

        let multiplier = match suffix {
            "" | "b" => 1,
            "k" | "kb" | "kib" => 1024,
            "m" | "mb" | "mib" => MB,
            "g" | "gb" | "gib" => GB,
            "t" | "tb" | "tib" => GB * 1024,
            _ => return Err(err()),
        };

        let bytes = value.checked_mul(multiplier).ok_or_else(err)?;
        if bytes == 0 {
            return Err(err());
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tib = GB * 1024;
        if self.bytes >= tib && self.bytes % tib == 0 {
            write!(f, "{}T", self.bytes / tib)
        } else if self.bytes >= GB && self.bytes % GB == 0 {
            write!(f, "{}G", self.bytes / GB)
        } else if self.bytes >= MB && self.bytes % MB == 0 {
            write!(f, "{}M", self.bytes / MB)
        } else if self.bytes >= 1024 && self.bytes % 1024 == 0 {
            write!(f, "{}K", self.bytes / 1024)
        } else {
            write!(f, "{}", self.bytes)
        }
    }
}
