//! Per-stream byte state machine reconstructing typed frames
//!
//! State transitions:
//! - `OutOfSync` → `Awaiting*` on a recognized identifier byte
//! - `Awaiting*` → `OutOfSync` once the expected payload length is
//!   reached, after the completed frame is returned
//!
//! The frame accumulator is bounds-checked: an append past the expected
//! payload length fails with `Error::DecodeOverflow` and resets the
//! decoder instead of corrupting memory.

use super::{
    Frame, PvSample, CMD_ID_REFERENCE_TIME, CMD_ID_SAMPLE, REFERENCE_TIME_LEN, SAMPLE_LEN,
};
use crate::error::{Error, Result};
use crate::StreamId;

/// Handling of identifier bytes that match no known command
///
/// Both options leave the decoder `OutOfSync` and drop the byte; they
/// differ only in whether the event is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownIdPolicy {
    /// Silently drop the byte
    #[default]
    Ignore,
    /// Count the byte and log a warning, then drop it
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OutOfSync,
    AwaitingReferenceTime,
    AwaitingSample,
}

/// Stateful one-byte-at-a-time frame decoder for a single stream
pub struct Decoder {
    stream: StreamId,
    state: State,
    buf: [u8; SAMPLE_LEN],
    filled: usize,
    policy: UnknownIdPolicy,
    unknown_ids: u64,
}

impl Decoder {
    pub fn new(stream: StreamId, policy: UnknownIdPolicy) -> Self {
        Decoder {
            stream,
            state: State::OutOfSync,
            buf: [0u8; SAMPLE_LEN],
            filled: 0,
            policy,
            unknown_ids: 0,
        }
    }

    /// Consume one byte; returns a frame when one completes
    ///
    /// `Err(DecodeOverflow)` is frame-fatal only: the decoder resets to
    /// `OutOfSync` and the next byte is treated as an identifier.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>> {
        match self.state {
            State::OutOfSync => {
                self.route_command(byte);
                Ok(None)
            }
            State::AwaitingReferenceTime => {
                if self.accumulate(byte, REFERENCE_TIME_LEN)? {
                    let ts = u32::from_le_bytes(self.buf[..REFERENCE_TIME_LEN].try_into().unwrap());
                    self.reset();
                    Ok(Some(Frame::ReferenceTime(ts)))
                } else {
                    Ok(None)
                }
            }
            State::AwaitingSample => {
                if self.accumulate(byte, SAMPLE_LEN)? {
                    let sample = PvSample::from_wire(&self.buf);
                    self.reset();
                    Ok(Some(Frame::Sample(sample)))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Unknown identifier bytes seen (only counted under `Report`)
    pub fn unknown_ids(&self) -> u64 {
        self.unknown_ids
    }

    fn route_command(&mut self, cmd: u8) {
        self.filled = 0;
        match cmd {
            CMD_ID_REFERENCE_TIME => self.state = State::AwaitingReferenceTime,
            CMD_ID_SAMPLE => self.state = State::AwaitingSample,
            other => {
                if self.policy == UnknownIdPolicy::Report {
                    self.unknown_ids += 1;
                    log::warn!(
                        "stream {}: unrecognized command id 0x{:02X}, dropped",
                        self.stream,
                        other
                    );
                }
            }
        }
    }

    /// Append a payload byte; true once the expected length is reached
    fn accumulate(&mut self, byte: u8, expected: usize) -> Result<bool> {
        if self.filled >= expected {
            let got = self.filled + 1;
            self.reset();
            return Err(Error::DecodeOverflow { expected, got });
        }
        self.buf[self.filled] = byte;
        self.filled += 1;
        Ok(self.filled == expected)
    }

    fn reset(&mut self) {
        self.state = State::OutOfSync;
        self.filled = 0;
    }
}
