//! Per-stream bounded sample history
//!
//! A fixed-depth circular buffer of the most recent samples plus a
//! pending count. The count is distinct from buffer fullness: once it
//! reaches depth, new samples are rejected rather than overwriting
//! unconsumed ones (unlike the byte transport). The eviction engine
//! drains the count without touching the stored samples.

use crate::proto::PvSample;

/// Circular sample buffer with pending count and estimated clock offset
pub struct SampleHistory {
    samples: Box<[PvSample]>,
    /// Next write slot
    top: usize,
    /// Unconsumed samples, `0..=depth`
    count: usize,
    /// Signed offset of the remote clock against the local master,
    /// `None` until the stream's first ReferenceTime frame
    offset: Option<i64>,
}

impl SampleHistory {
    /// # Panics
    /// Panics if `depth` is 0.
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "history depth must be non-zero");
        SampleHistory {
            samples: vec![PvSample::default(); depth].into_boxed_slice(),
            top: 0,
            count: 0,
            offset: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.samples.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i64) {
        self.offset = Some(offset);
    }

    /// Append a sample; returns false (sample dropped) when the pending
    /// count is already at depth
    pub fn push(&mut self, sample: PvSample) -> bool {
        if self.count == self.depth() {
            return false;
        }
        self.samples[self.top] = sample;
        self.top = (self.top + 1) % self.depth();
        self.count += 1;
        true
    }

    /// Sample `behind` positions before the most recent one
    ///
    /// `behind == 0` is the newest sample. Callers must keep `behind`
    /// within the pending count.
    pub fn recent(&self, behind: usize) -> PvSample {
        debug_assert!(behind < self.count);
        let depth = self.depth();
        self.samples[(self.top + depth - 1 - behind) % depth]
    }

    /// Mark the entire pending history as consumed
    pub fn consume_all(&mut self) {
        self.count = 0;
    }

    /// Keep only the newest `window` samples pending
    pub fn retain(&mut self, window: usize) {
        debug_assert!(window <= self.count);
        self.count = window;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::Vector3;

    fn sample(n: i32) -> PvSample {
        PvSample {
            position: Vector3 { u: n, w: n, v: n },
            velocity: Vector3::default(),
        }
    }

    #[test]
    fn test_push_and_recent() {
        let mut h = SampleHistory::new(8);
        for n in 0..5 {
            assert!(h.push(sample(n)));
        }
        assert_eq!(h.count(), 5);
        assert_eq!(h.recent(0), sample(4));
        assert_eq!(h.recent(4), sample(0));
    }

    #[test]
    fn test_reject_at_depth_never_overwrites() {
        let mut h = SampleHistory::new(4);
        for n in 0..4 {
            assert!(h.push(sample(n)));
        }
        // Full: pushes rejected, count pinned at depth
        assert!(!h.push(sample(99)));
        assert!(!h.push(sample(100)));
        assert_eq!(h.count(), 4);
        assert_eq!(h.recent(0), sample(3));
        assert_eq!(h.recent(3), sample(0));
    }

    #[test]
    fn test_recent_wraps_after_drain() {
        let mut h = SampleHistory::new(4);
        for n in 0..4 {
            h.push(sample(n));
        }
        h.consume_all();
        // Writes continue around the ring
        h.push(sample(10));
        h.push(sample(11));
        assert_eq!(h.count(), 2);
        assert_eq!(h.recent(0), sample(11));
        assert_eq!(h.recent(1), sample(10));
    }

    #[test]
    fn test_retain_window() {
        let mut h = SampleHistory::new(8);
        for n in 0..6 {
            h.push(sample(n));
        }
        h.retain(2);
        assert_eq!(h.count(), 2);
        assert_eq!(h.recent(0), sample(5));
        assert_eq!(h.recent(1), sample(4));
    }

    #[test]
    fn test_offset_unset_until_set() {
        let mut h = SampleHistory::new(4);
        assert_eq!(h.offset(), None);
        h.set_offset(0);
        // True zero offset is distinct from "unset"
        assert_eq!(h.offset(), Some(0));
        h.set_offset(-25);
        assert_eq!(h.offset(), Some(-25));
    }
}
