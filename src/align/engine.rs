//! Sample pairing and eviction
//!
//! The stream whose clock offset is larger runs ahead of the master
//! clock and is treated as "delayed"; the other is "in time". Their
//! skew maps to a delay in samples, and an aligned record pairs the
//! newest in-time sample with the delayed sample that far behind its
//! own newest. The drain after emission is asymmetric: the in-time
//! history is consumed entirely while the delayed history keeps a
//! `delay`-deep sliding window for the next round.

use super::clock::ReferenceClock;
use super::history::SampleHistory;
use super::policy::DelayPolicy;
use crate::proto::{Frame, PvSample, Timestamp};
use crate::{StreamId, STREAM_COUNT};
use std::fmt;

/// One aligned output tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedRecord {
    pub local_ts: Timestamp,
    pub in_time_id: StreamId,
    pub in_time: PvSample,
    pub delayed_id: StreamId,
    pub delayed: PvSample,
}

impl fmt::Display for AlignedRecord {
    /// One line per eviction; the `#####` prefix separates plottable
    /// records from console messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pv = |f: &mut fmt::Formatter<'_>, s: &PvSample| {
            write!(
                f,
                "{{{}, {}, {}, {}, {}, {}}}",
                s.position.u, s.position.w, s.position.v, s.velocity.u, s.velocity.w, s.velocity.v
            )
        };
        write!(f, "##### {} : {{{} : ", self.local_ts, self.in_time_id)?;
        pv(f, &self.in_time)?;
        write!(f, " {} : ", self.delayed_id)?;
        pv(f, &self.delayed)?;
        write!(f, "}}")
    }
}

/// Alignment engine owning both streams' histories
///
/// Single-consumer by design: all mutation happens on the matcher
/// thread, so no internal locking. A multi-consumer topology would need
/// per-stream locks around history and offset updates.
pub struct Aligner {
    histories: [SampleHistory; STREAM_COUNT],
    policy: Box<dyn DelayPolicy>,
    clock: Box<dyn ReferenceClock>,
}

impl Aligner {
    pub fn new(depth: usize, policy: Box<dyn DelayPolicy>, clock: Box<dyn ReferenceClock>) -> Self {
        Aligner {
            histories: [SampleHistory::new(depth), SampleHistory::new(depth)],
            policy,
            clock,
        }
    }

    /// Dispatch a completed frame from the given stream
    pub fn handle_frame(&mut self, stream: StreamId, frame: Frame) -> Option<AlignedRecord> {
        match frame {
            Frame::ReferenceTime(ts) => {
                self.set_reference(stream, ts);
                None
            }
            Frame::Sample(sample) => self.append_sample(stream, sample),
        }
    }

    /// Estimate the stream's clock offset from a ReferenceTime frame
    ///
    /// The offset is a relative ranking value against the local master
    /// clock, not a propagation delay.
    fn set_reference(&mut self, stream: StreamId, remote_ts: Timestamp) {
        let local = self.clock.now();
        let offset = remote_ts as i64 - local as i64;
        self.histories[stream].set_offset(offset);
        log::info!("stream {}: clock offset set to {}", stream, offset);
    }

    fn append_sample(&mut self, stream: StreamId, sample: PvSample) -> Option<AlignedRecord> {
        if !self.histories[stream].push(sample) {
            // Back-pressure: reject, never overwrite pending samples
            log::warn!("stream {}: history full, sample dropped", stream);
            return None;
        }
        self.try_evict()
    }

    /// Attempt to pair and emit one aligned record
    fn try_evict(&mut self) -> Option<AlignedRecord> {
        // Both clock offsets must be known
        let offset_0 = self.histories[0].offset()?;
        let offset_1 = self.histories[1].offset()?;

        let (delayed_id, in_time_id, skew): (StreamId, StreamId, i64) = if offset_0 > offset_1 {
            (0, 1, offset_0 - offset_1)
        } else {
            (1, 0, offset_1 - offset_0)
        };
        let skew = u32::try_from(skew).unwrap_or(u32::MAX);

        let delay = self.policy.delay(skew);

        if self.histories[in_time_id].count() == 0 || self.histories[delayed_id].count() <= delay {
            return None;
        }

        let in_time = self.histories[in_time_id].recent(0);
        let delayed = self.histories[delayed_id].recent(delay);

        self.histories[in_time_id].consume_all();
        self.histories[delayed_id].retain(delay);

        Some(AlignedRecord {
            local_ts: self.clock.now(),
            in_time_id,
            in_time,
            delayed_id,
            delayed,
        })
    }
}
