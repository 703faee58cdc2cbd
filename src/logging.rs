use std::fs::OpenOptions;
use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::config::LogConfig;
use crate::error::ConfigError;

/// Initialise the process-wide logger.
///
/// Format carries the field-system day-of-year timestamp
/// (`2026.218.14:05:33-INFO: ...`). `debug` forces the debug level over
/// the configured one. With `file` set, output goes to that file instead
/// of stderr.
pub fn init(config: &LogConfig, debug: bool) -> Result<(), ConfigError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        parse_level(&config.level)?
    };

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{}-{}: {}",
            Local::now().format("%Y.%j.%H:%M:%S"),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = &config.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ConfigError::Io(format!("failed to open log file {}: {}", path, e)))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    // A second init (tests) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" => Ok(LevelFilter::Off),
        other => Err(ConfigError::Parse(format!("invalid log level: {}", other))),
    }
}
