//! Local master clock sources
//!
//! The alignment algorithm needs only two things from the local clock:
//! readings never decrease (short of 32-bit wrap), and they share a
//! timebase with the streams' reported timestamps after offset
//! correction.

use crate::proto::Timestamp;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Monotonically non-decreasing local reference clock
///
/// Every read may advance the counter by a non-negative increment.
pub trait ReferenceClock: Send {
    fn now(&mut self) -> Timestamp;
}

/// Production clock: milliseconds elapsed since construction
///
/// Wraps with the 32-bit timestamp domain after ~49 days.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceClock for MonotonicClock {
    fn now(&mut self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

/// Clock advanced by a random step on every read
///
/// Stand-in for a real time service in demos. If `seed` is 0 the steps
/// are drawn from entropy, otherwise they are reproducible.
pub struct SteppedClock {
    rng: SmallRng,
    current: Timestamp,
    max_step: Timestamp,
}

impl SteppedClock {
    pub fn new(seed: u64, max_step: Timestamp) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        SteppedClock {
            rng,
            current: 0,
            max_step,
        }
    }
}

impl ReferenceClock for SteppedClock {
    fn now(&mut self) -> Timestamp {
        let step = self.rng.gen_range(0..=self.max_step);
        self.current = self.current.wrapping_add(step);
        self.current
    }
}

/// Clock returning a scripted sequence of readings, for tests
///
/// Once the script is exhausted the last reading repeats.
pub struct ScriptClock {
    readings: Vec<Timestamp>,
    next: usize,
}

impl ScriptClock {
    pub fn new(readings: Vec<Timestamp>) -> Self {
        assert!(!readings.is_empty(), "script must have at least one reading");
        ScriptClock { readings, next: 0 }
    }
}

impl ReferenceClock for ScriptClock {
    fn now(&mut self) -> Timestamp {
        let reading = self.readings[self.next.min(self.readings.len() - 1)];
        self.next += 1;
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_non_decreasing() {
        let mut clock = MonotonicClock::new();
        let mut last = clock.now();
        for _ in 0..1000 {
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_stepped_clock_non_decreasing() {
        let mut clock = SteppedClock::new(7, 1024);
        let mut last = clock.now();
        for _ in 0..1000 {
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_stepped_clock_reproducible() {
        let mut a = SteppedClock::new(42, 1024);
        let mut b = SteppedClock::new(42, 1024);
        for _ in 0..100 {
            assert_eq!(a.now(), b.now());
        }
    }

    #[test]
    fn test_script_clock_repeats_last() {
        let mut clock = ScriptClock::new(vec![50, 60]);
        assert_eq!(clock.now(), 50);
        assert_eq!(clock.now(), 60);
        assert_eq!(clock.now(), 60);
    }
}
