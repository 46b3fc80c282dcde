//! Configuration for the Yugma daemon
//!
//! Loads configuration from a TOML file; every section has defaults so
//! a partial (or absent) file works.

use crate::align::{DelayPolicy, FixedDelay, LinearDelay};
use crate::error::{Error, Result};
use crate::STREAM_COUNT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub channel: ChannelConfig,
    pub history: HistoryConfig,
    pub align: AlignConfig,
    pub matcher: MatcherConfig,
    pub feeder: FeederConfig,
    pub logging: LoggingConfig,
}

/// Byte channel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Ring capacity in bytes per channel
    pub capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig { capacity: 1024 }
    }
}

/// Sample history configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Samples retained per stream
    pub depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig { depth: 1024 }
    }
}

/// Skew-to-delay policy selection
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlignConfig {
    /// `"linear"` (delay = skew / sample_period) or `"fixed"`
    pub policy: String,
    /// Sample period in timestamp units, used by the linear policy
    pub sample_period: u32,
    /// Constant delay in samples, used by the fixed policy
    pub fixed_delay: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        AlignConfig {
            policy: "linear".to_string(),
            sample_period: 1,
            fixed_delay: 4,
        }
    }
}

impl AlignConfig {
    /// Build the configured delay policy
    pub fn delay_policy(&self) -> Result<Box<dyn DelayPolicy>> {
        match self.policy.as_str() {
            "linear" => {
                if self.sample_period == 0 {
                    return Err(Error::InvalidParameter(
                        "align.sample_period must be non-zero".to_string(),
                    ));
                }
                Ok(Box::new(LinearDelay::new(self.sample_period)))
            }
            "fixed" => Ok(Box::new(FixedDelay(self.fixed_delay))),
            other => Err(Error::InvalidParameter(format!(
                "unknown align.policy: {other:?} (expected \"linear\" or \"fixed\")"
            ))),
        }
    }
}

/// Matcher thread configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Idle timeout in milliseconds; expiry stops the matcher for good
    pub idle_timeout_ms: u64,
    /// Report (count + warn) unrecognized command identifier bytes
    /// instead of dropping them silently
    pub report_unknown_ids: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            idle_timeout_ms: 2000,
            report_unknown_ids: false,
        }
    }
}

/// Feeder (file replay) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeederConfig {
    /// One recorded file per stream
    pub stream_files: Vec<String>,
    /// Delay between replayed chunks, microseconds
    pub chunk_delay_us: u64,
}

impl Default for FeederConfig {
    fn default() -> Self {
        FeederConfig {
            stream_files: vec!["s0.dat".to_string(), "s1.dat".to_string()],
            chunk_delay_us: 1000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.channel.capacity == 0 {
            return Err(Error::InvalidParameter(
                "channel.capacity must be non-zero".to_string(),
            ));
        }
        if self.history.depth == 0 {
            return Err(Error::InvalidParameter(
                "history.depth must be non-zero".to_string(),
            ));
        }
        if self.feeder.stream_files.len() != STREAM_COUNT {
            return Err(Error::InvalidParameter(format!(
                "feeder.stream_files must list exactly {} files",
                STREAM_COUNT
            )));
        }
        self.align.delay_policy().map(|_| ())
    }
}
