//! Storage adapters: free-space probing and segment files

mod directory;
mod statvfs;

pub use directory::{DirectoryOutputProvider, SEGMENT_DIR_NAME, SEGMENT_PREFIX};
pub use statvfs::StatvfsProbe;
