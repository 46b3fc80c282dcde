//! Test-data generator for the Yugma daemon
//!
//! Writes `s0.dat` and `s1.dat`: 1024 frames per stream, one
//! ReferenceTime frame at a random early position and monotonically
//! increasing random sample fields for the rest, so the aligned output
//! is plottable.
//!
//! Usage: `genstreams [seed]` — seed 0 (the default) draws from entropy.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use yugma::proto::{encode_reference_time, encode_sample, PvSample, Vector3};
use yugma::{Result, STREAM_COUNT};

const FRAMES_PER_STREAM: usize = 1024;
const FIELD_MAX: i32 = 1024;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let mut rng = if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed)
    };

    let mut local_timestamp: u32 = 0;

    for stream in 0..STREAM_COUNT {
        // Six independent sorted columns so each field rises over time
        let mut fields = [[0i32; FRAMES_PER_STREAM]; 6];
        for column in fields.iter_mut() {
            for value in column.iter_mut() {
                *value = rng.gen_range(0..=FIELD_MAX);
            }
            column.sort_unstable();
        }

        local_timestamp += rng.gen_range(0..=1024);
        let rt_position = rng.gen_range(0..8);

        let path = format!("s{}.dat", stream);
        let mut out = BufWriter::new(File::create(&path)?);
        for i in 0..FRAMES_PER_STREAM {
            if i == rt_position {
                out.write_all(&encode_reference_time(local_timestamp))?;
            } else {
                let sample = PvSample {
                    position: Vector3 {
                        u: fields[0][i],
                        w: fields[1][i],
                        v: fields[2][i],
                    },
                    velocity: Vector3 {
                        u: fields[3][i],
                        w: fields[4][i],
                        v: fields[5][i],
                    },
                };
                out.write_all(&encode_sample(&sample))?;
            }
        }
        out.flush()?;
        log::info!(
            "wrote {} ({} frames, reference at {})",
            path,
            FRAMES_PER_STREAM,
            rt_position
        );
    }

    Ok(())
}
