//! Logging subsystem: stdout plus an optional rolling file.

pub mod manager;
pub mod types;

#[cfg(test)]
mod tests;

pub use manager::{InitError, init};
pub use tracing_appender::rolling::Rotation;
pub use types::{FileLoggingConfig, LogFormat, LoggerConfig, StdoutConfig};
