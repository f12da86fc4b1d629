//! Logging initialization.

use thiserror::Error;
use tracing::{Level, info};
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::ParseError,
    fmt::layer,
    layer::SubscriberExt,
    registry,
    util::{SubscriberInitExt, TryInitError},
};

use super::types::{LogFormat, LoggerConfig};

/// Errors returned by [`init`].
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid filter directive: {0}")]
    Directive(#[from] ParseError),

    #[error("failed to create log file appender: {0}")]
    FileAppender(#[from] rolling::InitError),

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Builds the env filter: INFO by default, overridable via `RUST_LOG`, then the
/// configured directives on top.
pub(crate) fn build_filter(directives: &[String]) -> Result<EnvFilter, InitError> {
    directives.iter().try_fold(
        EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .from_env_lossy(),
        |filter, directive| -> Result<EnvFilter, InitError> {
            Ok(filter.add_directive(directive.parse()?))
        },
    )
}

/// Installs the global subscriber: stdout always, plus the rolling file sink when
/// configured. Fails if a subscriber is already installed.
pub fn init(config: LoggerConfig) -> Result<(), InitError> {
    let stdout_layer = match config.stdout.format {
        LogFormat::Compact => layer()
            .compact()
            .with_span_events(config.stdout.fmt_span.clone())
            .with_filter(build_filter(&config.directives)?)
            .boxed(),
        LogFormat::Json => layer()
            .json()
            .with_span_events(config.stdout.fmt_span.clone())
            .with_filter(build_filter(&config.directives)?)
            .boxed(),
    };

    let file_layer = match &config.file {
        Some(file) => {
            let appender = RollingFileAppender::builder()
                .rotation(file.rotation.clone())
                .filename_prefix(&file.file_name_prefix)
                .build(&file.directory)?;
            let filter = build_filter(&config.directives)?;
            Some(match file.format {
                LogFormat::Compact => layer()
                    .compact()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_filter(filter)
                    .boxed(),
                LogFormat::Json => layer()
                    .json()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_filter(filter)
                    .boxed(),
            })
        }
        None => None,
    };

    registry().with(stdout_layer).with(file_layer).try_init()?;

    info!(
        service = %config.service_name,
        file_logging = config.file.is_some(),
        "logging initialized"
    );
    Ok(())
}
