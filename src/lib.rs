//! Yugma - time-alignment daemon for paired telemetry streams
//!
//! Two independently-clocked streams deliver clock-reference and
//! position/velocity messages over byte channels. Yugma estimates each
//! stream's offset against a local master clock and pairs samples from
//! both streams into time-aligned output records.
//!
//! ## Components
//!
//! - [`channel`]: bounded byte ring transport with doorbell notification
//! - [`proto`]: wire framing and the per-stream command decoder
//! - [`align`]: clock offset estimation, sample history, eviction engine
//! - [`matcher`]: the consumer loop draining channels into the aligner
//! - [`feeder`]: file-backed data source writing raw words into channels

pub mod align;
pub mod channel;
pub mod config;
pub mod error;
pub mod feeder;
pub mod matcher;
pub mod proto;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};

/// Index identifying one of the paired input streams
pub type StreamId = usize;

/// Number of input streams
///
/// The eviction algorithm pairs exactly two streams; this is not a
/// tunable (see `align::engine`).
pub const STREAM_COUNT: usize = 2;
