//! Matcher consumer loop
//!
//! A single thread blocks on the shared notifier with a bounded wait.
//! Any doorbell releases it; since the wake carries no channel
//! information, every channel is drained on every wake. A wait that
//! expires with no signal is terminal: input has stopped and the
//! matcher exits permanently.

use crate::align::{AlignedRecord, Aligner};
use crate::channel::{Channel, Notifier};
use crate::proto::Decoder;
use crate::STREAM_COUNT;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Consumer context: channels, decoders, and the alignment engine
pub struct Matcher {
    channels: [Arc<Channel>; STREAM_COUNT],
    decoders: [Decoder; STREAM_COUNT],
    aligner: Aligner,
    notifier: Arc<Notifier>,
    idle_timeout: Duration,
    records: Sender<AlignedRecord>,
    shutdown: Arc<AtomicBool>,
}

impl Matcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        channels: [Arc<Channel>; STREAM_COUNT],
        decoders: [Decoder; STREAM_COUNT],
        aligner: Aligner,
        notifier: Arc<Notifier>,
        idle_timeout: Duration,
        records: Sender<AlignedRecord>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Matcher {
            channels,
            decoders,
            aligner,
            notifier,
            idle_timeout,
            records,
            shutdown,
        }
    }

    /// Run until the idle timeout expires or shutdown is requested
    pub fn run(&mut self) {
        log::info!(
            "matcher started (idle timeout {} ms)",
            self.idle_timeout.as_millis()
        );
        while !self.shutdown.load(Ordering::Relaxed) {
            if !self.notifier.wait(self.idle_timeout) {
                log::info!("no data within idle timeout, matcher stopping");
                break;
            }
            self.drain_all();
        }
        log::info!("matcher exiting");
    }

    /// Drain every channel and feed the bytes through its decoder
    fn drain_all(&mut self) {
        let mut chunk = [0u8; 64];
        for stream in 0..STREAM_COUNT {
            loop {
                let n = self.channels[stream].read(&mut chunk);
                if n == 0 {
                    break;
                }
                for &byte in &chunk[..n] {
                    match self.decoders[stream].feed(byte) {
                        Ok(Some(frame)) => {
                            if let Some(record) = self.aligner.handle_frame(stream, frame) {
                                if self.records.send(record).is_err() {
                                    log::warn!("record receiver dropped, output lost");
                                }
                            }
                        }
                        Ok(None) => {}
                        Err(e) => log::warn!("stream {}: {}", stream, e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{LinearDelay, ScriptClock};
    use crate::proto::{encode_reference_time, encode_sample, PvSample, UnknownIdPolicy, Vector3};
    use std::thread;

    fn sample(n: i32) -> PvSample {
        PvSample {
            position: Vector3 { u: n, w: n, v: n },
            velocity: Vector3::default(),
        }
    }

    /// Full producer/consumer round trip over real channels and threads
    #[test]
    fn test_feed_and_align_end_to_end() {
        let notifier = Notifier::new();
        let ch0 = Channel::open(0, 1024, Some(notifier.doorbell()));
        let ch1 = Channel::open(1, 1024, Some(notifier.doorbell()));

        // Both reference frames are timestamped against local reading 50,
        // whichever the matcher happens to decode first: offsets +50 and
        // +30, stream 0 delayed, skew 20.
        let aligner = Aligner::new(
            64,
            Box::new(LinearDelay::new(1)),
            Box::new(ScriptClock::new(vec![50, 50, 999])),
        );
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut matcher = Matcher::new(
            [Arc::clone(&ch0), Arc::clone(&ch1)],
            [
                Decoder::new(0, UnknownIdPolicy::Ignore),
                Decoder::new(1, UnknownIdPolicy::Ignore),
            ],
            aligner,
            Arc::clone(&notifier),
            Duration::from_millis(200),
            tx,
            Arc::new(AtomicBool::new(false)),
        );
        let consumer = thread::spawn(move || matcher.run());

        let producer = thread::spawn(move || {
            ch0.write(&encode_reference_time(100));
            ch1.write(&encode_reference_time(80));
            for n in 0..21 {
                ch0.write(&encode_sample(&sample(n)));
            }
            ch1.write(&encode_sample(&sample(1000)));
        });
        producer.join().unwrap();

        // skew 20 with period-1 mapping: the paired delayed sample sits
        // 20 positions behind stream 0's newest (index 20)
        let record = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(record.in_time_id, 1);
        assert_eq!(record.in_time, sample(1000));
        assert_eq!(record.delayed_id, 0);
        assert_eq!(record.delayed, sample(0));

        // No producer activity: matcher stops on idle timeout
        consumer.join().unwrap();
        assert!(rx.try_recv().is_err());
    }

    /// Garbage interleaved between frames must not break alignment
    #[test]
    fn test_tolerates_garbage_between_frames() {
        let notifier = Notifier::new();
        let ch0 = Channel::open(0, 1024, Some(notifier.doorbell()));
        let ch1 = Channel::open(1, 1024, Some(notifier.doorbell()));

        let aligner = Aligner::new(
            16,
            Box::new(LinearDelay::new(1)),
            Box::new(ScriptClock::new(vec![100, 100])),
        );
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut matcher = Matcher::new(
            [Arc::clone(&ch0), Arc::clone(&ch1)],
            [
                Decoder::new(0, UnknownIdPolicy::Ignore),
                Decoder::new(1, UnknownIdPolicy::Ignore),
            ],
            aligner,
            Arc::clone(&notifier),
            Duration::from_millis(200),
            tx,
            Arc::new(AtomicBool::new(false)),
        );
        let consumer = thread::spawn(move || matcher.run());

        // Unknown identifier bytes before each valid frame
        ch0.write(&[0xFF, 0xEE]);
        ch0.write(&encode_reference_time(100));
        ch1.write(&encode_reference_time(100));
        ch0.write(&[0x42]);
        ch0.write(&encode_sample(&sample(5)));
        ch1.write(&encode_sample(&sample(6)));

        let record = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(record.delayed, sample(6));
        assert_eq!(record.in_time, sample(5));
        consumer.join().unwrap();
    }

    /// Shutdown flag stops the loop even with the notifier raised
    #[test]
    fn test_shutdown_flag_stops_matcher() {
        let notifier = Notifier::new();
        let ch0 = Channel::open(0, 64, Some(notifier.doorbell()));
        let ch1 = Channel::open(1, 64, Some(notifier.doorbell()));
        let shutdown = Arc::new(AtomicBool::new(true));

        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut matcher = Matcher::new(
            [ch0, ch1],
            [
                Decoder::new(0, UnknownIdPolicy::Ignore),
                Decoder::new(1, UnknownIdPolicy::Ignore),
            ],
            Aligner::new(
                8,
                Box::new(LinearDelay::new(1)),
                Box::new(ScriptClock::new(vec![0])),
            ),
            notifier,
            Duration::from_secs(60),
            tx,
            shutdown,
        );
        // Returns immediately instead of blocking for the full minute
        matcher.run();
    }
}
