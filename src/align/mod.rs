//! Clock-offset estimation and sample alignment
//!
//! Each stream keeps a bounded history of its most recent samples plus
//! an estimated clock offset against the local master clock. Once both
//! offsets are known, the engine maps their skew to a sample-count
//! delay and pairs samples from the two histories into aligned records.

mod clock;
mod engine;
mod history;
mod policy;

pub use clock::{MonotonicClock, ReferenceClock, ScriptClock, SteppedClock};
pub use engine::{AlignedRecord, Aligner};
pub use history::SampleHistory;
pub use policy::{DelayPolicy, FixedDelay, LinearDelay};
