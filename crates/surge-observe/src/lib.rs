//! Structured logging bootstrap for the surge binaries.
//!
//! One global `tracing` subscriber: an `EnvFilter` in front of a fmt layer that
//! writes either human-readable lines or flattened JSON, timestamped in RFC3339
//! with the local UTC offset.

mod config;
pub use config::LoggerConfig;

mod error;
pub use error::LoggerError;

mod format;
pub use format::LoggerFormat;

mod subscriber;

/// Install the global subscriber described by `cfg`.
///
/// Only the first successful call in a process takes effect; later calls fail with
/// [`LoggerError::Install`].
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    subscriber::install(cfg)
}
