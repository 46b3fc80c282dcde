//! File-backed data source
//!
//! Loads one binary file per stream and replays it into the stream's
//! channel in small word-sized chunks, picking the target stream at
//! random per chunk and sleeping between chunks to approximate the
//! bursty, interleaved arrival of real telemetry links.

use crate::channel::Channel;
use crate::error::Result;
use crate::{StreamId, STREAM_COUNT};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Chunk size replayed per write, matching the 32-bit word granularity
/// of the recorded streams
const CHUNK_BYTES: usize = 4;

/// Replays recorded stream files into the channels
pub struct Feeder {
    channels: [Arc<Channel>; STREAM_COUNT],
    sources: [Vec<u8>; STREAM_COUNT],
    chunk_delay: Duration,
    rng: SmallRng,
    shutdown: Arc<AtomicBool>,
}

impl Feeder {
    /// Load both stream files into memory
    pub fn load<P: AsRef<Path>>(
        paths: [P; STREAM_COUNT],
        channels: [Arc<Channel>; STREAM_COUNT],
        chunk_delay: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self> {
        let [p0, p1] = paths;
        let sources = [fs::read(&p0)?, fs::read(&p1)?];
        for (stream, source) in sources.iter().enumerate() {
            log::info!("feeder: stream {} source is {} bytes", stream, source.len());
        }
        Ok(Feeder {
            channels,
            sources,
            chunk_delay,
            rng: SmallRng::from_entropy(),
            shutdown,
        })
    }

    /// Replay until both sources are exhausted
    pub fn run(&mut self) {
        let mut cursors = [0usize; STREAM_COUNT];
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                log::info!("feeder: shutdown requested");
                return;
            }
            let pending: Vec<StreamId> = (0..STREAM_COUNT)
                .filter(|&s| cursors[s] < self.sources[s].len())
                .collect();
            if pending.is_empty() {
                break;
            }

            // Next chunk goes to a randomly chosen still-active stream
            let stream = pending[self.rng.gen_range(0..pending.len())];
            let cursor = cursors[stream];
            let end = (cursor + CHUNK_BYTES).min(self.sources[stream].len());
            self.channels[stream].write(&self.sources[stream][cursor..end]);
            cursors[stream] = end;

            std::thread::sleep(self.chunk_delay);
        }
        log::info!("feeder: all streams exhausted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("yugma-feeder-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_replays_each_file_into_its_channel() {
        let data0: Vec<u8> = (0u8..37).collect();
        let data1: Vec<u8> = (100u8..150).collect();
        let p0 = temp_file("s0", &data0);
        let p1 = temp_file("s1", &data1);

        let ch0 = Channel::open(0, 4096, None);
        let ch1 = Channel::open(1, 4096, None);
        let mut feeder = Feeder::load(
            [&p0, &p1],
            [Arc::clone(&ch0), Arc::clone(&ch1)],
            Duration::ZERO,
            Arc::new(AtomicBool::new(false)),
        )
        .unwrap();
        feeder.run();

        let mut buf = vec![0u8; 4096];
        let n = ch0.read(&mut buf);
        assert_eq!(&buf[..n], &data0[..]);
        let n = ch1.read(&mut buf);
        assert_eq!(&buf[..n], &data1[..]);

        fs::remove_file(p0).unwrap();
        fs::remove_file(p1).unwrap();
    }

    #[test]
    fn test_missing_file_fails_at_load() {
        let ch0 = Channel::open(0, 64, None);
        let ch1 = Channel::open(1, 64, None);
        let result = Feeder::load(
            ["/nonexistent/yugma-s0.dat", "/nonexistent/yugma-s1.dat"],
            [ch0, ch1],
            Duration::ZERO,
            Arc::new(AtomicBool::new(false)),
        );
        assert!(result.is_err());
    }
}
