//! Bounded byte transport between one producer and the matcher
//!
//! Each channel owns a fixed-capacity byte ring guarded by a single
//! exclusive lock, so a read and a write on the same channel never
//! overlap while distinct channels never contend. Writes always accept
//! the full input: once the ring is full the oldest unread bytes are
//! overwritten (an overrun, counted and logged, never fatal). Reads are
//! non-blocking and return 0 when the ring is empty.

use crate::StreamId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

mod notifier;
pub use notifier::Notifier;

/// Notification hook fired once per successful write, on the writer's
/// thread. Must not block and must not touch channel data.
pub type Doorbell = Arc<dyn Fn(StreamId) + Send + Sync>;

struct Ring {
    buf: Box<[u8]>,
    rpos: usize,
    wpos: usize,
    count: usize,
}

impl Ring {
    /// Append all bytes, overwriting oldest unread data when full.
    /// Returns the number of unread bytes lost.
    fn push_all(&mut self, data: &[u8]) -> usize {
        let cap = self.buf.len();
        let mut lost = 0;
        for &byte in data {
            if self.count == cap {
                // Overrun: drop the oldest unread byte
                self.rpos = (self.rpos + 1) % cap;
                self.count -= 1;
                lost += 1;
            }
            self.buf[self.wpos] = byte;
            self.wpos = (self.wpos + 1) % cap;
            self.count += 1;
        }
        lost
    }

    fn pop_into(&mut self, out: &mut [u8]) -> usize {
        let cap = self.buf.len();
        let n = out.len().min(self.count);
        for slot in out.iter_mut().take(n) {
            *slot = self.buf[self.rpos];
            self.rpos = (self.rpos + 1) % cap;
            self.count -= 1;
        }
        n
    }
}

/// Bounded byte channel with overwrite-on-overrun semantics
pub struct Channel {
    id: StreamId,
    ring: Mutex<Ring>,
    doorbell: Option<Doorbell>,
    overruns: AtomicU64,
}

impl Channel {
    /// Open a channel with the given ring capacity and optional doorbell
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn open(id: StreamId, capacity: usize, doorbell: Option<Doorbell>) -> Arc<Self> {
        assert!(capacity > 0, "channel capacity must be non-zero");
        Arc::new(Channel {
            id,
            ring: Mutex::new(Ring {
                buf: vec![0u8; capacity].into_boxed_slice(),
                rpos: 0,
                wpos: 0,
                count: 0,
            }),
            doorbell,
            overruns: AtomicU64::new(0),
        })
    }

    /// Channel identifier
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Write all bytes, returning the input length
    ///
    /// Fires the doorbell exactly once per call when `data` is non-empty,
    /// after the ring lock has been released.
    pub fn write(&self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let lost = {
            let mut ring = self.ring.lock();
            ring.push_all(data)
        };
        if lost > 0 {
            self.overruns.fetch_add(1, Ordering::Relaxed);
            log::warn!("channel {}: overrun, {} oldest bytes lost", self.id, lost);
        }
        if let Some(bell) = &self.doorbell {
            bell(self.id);
        }
        data.len()
    }

    /// Read up to `buf.len()` bytes, never blocking
    pub fn read(&self, buf: &mut [u8]) -> usize {
        self.ring.lock().pop_into(buf)
    }

    /// Bytes currently buffered
    pub fn available(&self) -> usize {
        self.ring.lock().count
    }

    /// Number of write calls that overwrote unread data
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}
