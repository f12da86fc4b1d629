//! Logger settings.

use std::path::PathBuf;

use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

/// Line format of a log sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

/// The stdout sink, which is always installed.
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    pub format: LogFormat,
    /// Span lifecycle events to emit, none by default.
    pub fmt_span: FmtSpan,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            fmt_span: FmtSpan::NONE,
        }
    }
}

/// A rolling file sink. Files are named `<prefix>.<period>` inside `directory`.
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,
    pub file_name_prefix: String,
    pub rotation: Rotation,
    pub format: LogFormat,
}

impl FileLoggingConfig {
    /// Daily rotation, compact lines.
    pub fn new(directory: impl Into<PathBuf>, file_name_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name_prefix: file_name_prefix.into(),
            rotation: Rotation::DAILY,
            format: LogFormat::Compact,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Everything [`init`](super::init) needs.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Reported in the first event once logging is up.
    pub service_name: String,
    /// Filter directives applied on top of `RUST_LOG`, e.g. `tapstake_coin_select=debug`.
    pub directives: Vec<String>,
    pub stdout: StdoutConfig,
    pub file: Option<FileLoggingConfig>,
}

impl LoggerConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            directives: Vec::new(),
            stdout: StdoutConfig::default(),
            file: None,
        }
    }

    pub fn with_stdout_format(mut self, format: LogFormat) -> Self {
        self.stdout.format = format;
        self
    }

    pub fn with_fmt_span(mut self, fmt_span: FmtSpan) -> Self {
        self.stdout.fmt_span = fmt_span;
        self
    }

    pub fn with_file_logging(mut self, file: FileLoggingConfig) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new("tapstake")
    }
}
