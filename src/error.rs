//! Error types for Yugma

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Yugma error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration serialize error
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Frame accumulator would exceed the expected payload length
    #[error("Frame accumulator overflow: expected {expected} bytes, got {got}")]
    DecodeOverflow {
        /// Payload length the current command expects
        expected: usize,
        /// Bytes the accumulator would hold after the append
        got: usize,
    },

    /// Invalid configuration value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
