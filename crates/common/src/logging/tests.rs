use std::env;

use tracing_subscriber::fmt::format::FmtSpan;

use super::{manager::build_filter, *};

#[test]
fn test_config_builders() {
    let dir = env::temp_dir().join("tapstake-logging-builder");
    let config = LoggerConfig::new("signer")
        .with_stdout_format(LogFormat::Json)
        .with_fmt_span(FmtSpan::CLOSE)
        .with_directive("tapstake_coin_select=debug")
        .with_file_logging(
            FileLoggingConfig::new(&dir, "tapstake")
                .with_rotation(Rotation::HOURLY)
                .with_format(LogFormat::Json),
        );

    assert_eq!(config.service_name, "signer");
    assert_eq!(config.stdout.format, LogFormat::Json);
    assert_eq!(config.directives, vec!["tapstake_coin_select=debug"]);
    let file = config.file.unwrap();
    assert_eq!(file.directory, dir);
    assert_eq!(file.format, LogFormat::Json);
}

#[test]
fn test_default_config() {
    let config = LoggerConfig::default();
    assert_eq!(config.service_name, "tapstake");
    assert_eq!(config.stdout.format, LogFormat::Compact);
    assert!(config.file.is_none());
}

#[test]
fn test_invalid_directive_rejected() {
    assert!(matches!(
        build_filter(&["tapstake=notalevel".to_string()]),
        Err(InitError::Directive(_))
    ));
    assert!(build_filter(&["tapstake_tx_builder=trace".to_string()]).is_ok());
}

#[test]
fn test_init_once() {
    let dir = env::temp_dir().join("tapstake-logging-init");
    let config =
        LoggerConfig::default().with_file_logging(FileLoggingConfig::new(dir, "tapstake"));
    init(config.clone()).unwrap();
    assert!(matches!(init(config), Err(InitError::AlreadyInitialized(_))));
}
