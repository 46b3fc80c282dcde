//! Yugma daemon entry point
//!
//! Wires the components together: two channels sharing one notifier, a
//! feeder thread replaying recorded stream files, a matcher thread
//! draining channels into the alignment engine, and the main thread
//! printing aligned records. The process ends when the matcher's idle
//! timeout expires (no input for the configured window) or on Ctrl-C.

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use yugma::align::{Aligner, MonotonicClock};
use yugma::channel::{Channel, Notifier};
use yugma::error::{Error, Result};
use yugma::feeder::Feeder;
use yugma::matcher::Matcher;
use yugma::proto::{Decoder, UnknownIdPolicy};
use yugma::Config;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `yugma <path>` (positional)
/// - `yugma --config <path>` (flag-based)
/// - `yugma -c <path>` (short flag)
///
/// Defaults to `yugma.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "yugma.toml".to_string()
}

fn main() -> Result<()> {
    let config_path = parse_config_path();
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Yugma starting (config: {})", config_path);

    // Shared wake primitive; every channel's doorbell raises it
    let notifier = Notifier::new();
    let channels = [
        Channel::open(0, config.channel.capacity, Some(notifier.doorbell())),
        Channel::open(1, config.channel.capacity, Some(notifier.doorbell())),
    ];

    let policy = config.align.delay_policy()?;
    let aligner = Aligner::new(config.history.depth, policy, Box::new(MonotonicClock::new()));

    let id_policy = if config.matcher.report_unknown_ids {
        UnknownIdPolicy::Report
    } else {
        UnknownIdPolicy::Ignore
    };
    let decoders = [Decoder::new(0, id_policy), Decoder::new(1, id_policy)];

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        let notifier = Arc::clone(&notifier);
        ctrlc::set_handler(move || {
            log::info!("received shutdown signal");
            shutdown.store(true, Ordering::Relaxed);
            // Wake the matcher so it notices the flag promptly
            notifier.notify();
        })
        .map_err(|e| Error::Other(format!("failed to set Ctrl-C handler: {}", e)))?;
    }

    let (record_tx, record_rx) = crossbeam_channel::unbounded();
    let mut matcher = Matcher::new(
        [Arc::clone(&channels[0]), Arc::clone(&channels[1])],
        decoders,
        aligner,
        Arc::clone(&notifier),
        Duration::from_millis(config.matcher.idle_timeout_ms),
        record_tx,
        Arc::clone(&shutdown),
    );

    let stream_files = [
        config.feeder.stream_files[0].clone(),
        config.feeder.stream_files[1].clone(),
    ];
    let mut feeder = Feeder::load(
        stream_files,
        [Arc::clone(&channels[0]), Arc::clone(&channels[1])],
        Duration::from_micros(config.feeder.chunk_delay_us),
        Arc::clone(&shutdown),
    )?;

    let matcher_handle = thread::Builder::new()
        .name("matcher".to_string())
        .spawn(move || matcher.run())?;

    let feeder_handle = thread::Builder::new()
        .name("feeder".to_string())
        .spawn(move || feeder.run())?;

    // Print aligned records until the matcher drops its sender
    for record in record_rx {
        println!("{}", record);
    }

    feeder_handle
        .join()
        .map_err(|_| Error::Other("feeder thread panicked".to_string()))?;
    matcher_handle
        .join()
        .map_err(|_| Error::Other("matcher thread panicked".to_string()))?;

    log::info!("Yugma stopped");
    Ok(())
}
