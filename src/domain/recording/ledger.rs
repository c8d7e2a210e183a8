//! Segment ledger: the ordered set of segments of the current session

use std::collections::VecDeque;

use super::segment::{Segment, SegmentId};

/// FIFO queue of produced segments.
///
/// Insertion order is eviction order: the oldest surviving segment is
/// always the first one handed out by [`SegmentLedger::evict_oldest`].
/// Releasing the backing storage of an evicted segment is the caller's job.
#[derive(Debug, Default)]
pub struct SegmentLedger {
    segments: VecDeque<Segment>,
}

impl SegmentLedger {
    pub fn new() -> Self {
        Self {
            segments: VecDeque::new(),
        }
    }

    /// Append a newly created segment
    pub fn enqueue(&mut self, segment: Segment) {
        self.segments.push_back(segment);
    }

    /// Remove and return the oldest segment, or `None` if the ledger is empty
    pub fn evict_oldest(&mut self) -> Option<Segment> {
        self.segments.pop_front()
    }

    /// Drop every segment of the session
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn oldest(&self) -> Option<&Segment> {
        self.segments.front()
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id() == id)
    }

    /// Sum of the bytes recorded across all tracked segments
    pub fn total_bytes(&self) -> u64 {
        self.segments.iter().map(Segment::bytes_recorded).sum()
    }
}
