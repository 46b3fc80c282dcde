//! Wire protocol for the paired telemetry streams
//!
//! Frame format (byte-serial, little-endian):
//! - Identifier `0x00`: ReferenceTime, 4-byte payload, `u32` remote timestamp
//! - Identifier `0x01`: Sample, 24-byte payload, six `i32` fields in order
//!   position(u, w, v), velocity(u, w, v)
//!
//! Any other identifier byte selects nothing; handling is a decoder
//! policy (see [`decoder::UnknownIdPolicy`]).

mod decoder;
pub use decoder::{Decoder, UnknownIdPolicy};

/// Command identifier for a ReferenceTime frame
pub const CMD_ID_REFERENCE_TIME: u8 = 0;
/// Command identifier for a Sample frame
pub const CMD_ID_SAMPLE: u8 = 1;

/// ReferenceTime payload length in bytes
pub const REFERENCE_TIME_LEN: usize = 4;
/// Sample payload length in bytes
pub const SAMPLE_LEN: usize = 24;

/// Remote/local timestamp type
///
/// 32 bits matches the wire format; the domain wraps.
pub type Timestamp = u32;

/// Three-axis vector in the stream's native (u, w, v) axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector3 {
    pub u: i32,
    pub w: i32,
    pub v: i32,
}

/// One position/velocity telemetry reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PvSample {
    pub position: Vector3,
    pub velocity: Vector3,
}

impl PvSample {
    /// Decode from a 24-byte little-endian payload
    pub fn from_wire(buf: &[u8; SAMPLE_LEN]) -> Self {
        let field = |i: usize| {
            i32::from_le_bytes([buf[i * 4], buf[i * 4 + 1], buf[i * 4 + 2], buf[i * 4 + 3]])
        };
        PvSample {
            position: Vector3 {
                u: field(0),
                w: field(1),
                v: field(2),
            },
            velocity: Vector3 {
                u: field(3),
                w: field(4),
                v: field(5),
            },
        }
    }

    /// Encode to a 24-byte little-endian payload
    pub fn to_wire(&self) -> [u8; SAMPLE_LEN] {
        let mut buf = [0u8; SAMPLE_LEN];
        let fields = [
            self.position.u,
            self.position.w,
            self.position.v,
            self.velocity.u,
            self.velocity.w,
            self.velocity.v,
        ];
        for (i, f) in fields.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&f.to_le_bytes());
        }
        buf
    }
}

/// A complete, typed command reconstructed from a channel's byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Remote timestamp used to estimate clock offset
    ReferenceTime(Timestamp),
    /// One position/velocity reading
    Sample(PvSample),
}

/// Encode a complete ReferenceTime frame (identifier + payload)
pub fn encode_reference_time(ts: Timestamp) -> [u8; 1 + REFERENCE_TIME_LEN] {
    let mut out = [0u8; 1 + REFERENCE_TIME_LEN];
    out[0] = CMD_ID_REFERENCE_TIME;
    out[1..].copy_from_slice(&ts.to_le_bytes());
    out
}

/// Encode a complete Sample frame (identifier + payload)
pub fn encode_sample(sample: &PvSample) -> [u8; 1 + SAMPLE_LEN] {
    let mut out = [0u8; 1 + SAMPLE_LEN];
    out[0] = CMD_ID_SAMPLE;
    out[1..].copy_from_slice(&sample.to_wire());
    out
}
