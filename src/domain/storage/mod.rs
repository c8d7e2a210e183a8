//! Storage domain types

mod volume;

pub use volume::{VolumeRef, DEFAULT_VOLUME_LABEL};
