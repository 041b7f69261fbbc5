//! Logger backend.
//!
//! The whole crate logs through the `log` facade.  This module installs
//! the backend exactly once at startup: `fern`, writing
//! `[elapsed LEVEL] message` lines to stderr and optionally to a file.
//! Stdout is left to the command link.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, info};

static EPOCH: OnceLock<Instant> = OnceLock::new();

#[derive(Debug)]
pub enum LoggerInitError {
    LogFile(std::io::Error),
    Install(log::SetLoggerError),
}

impl fmt::Display for LoggerInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogFile(e) => write!(f, "cannot open log file: {e}"),
            Self::Install(e) => write!(f, "cannot install logger: {e}"),
        }
    }
}

impl std::error::Error for LoggerInitError {}

/// Seconds since the logger was installed.
pub fn elapsed_secs() -> f64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Install the backend.  Must be called once.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<(), LoggerInitError> {
    EPOCH.get_or_init(Instant::now);

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:10.4} {}] {}: {}",
                    elapsed_secs(),
                    level_tag(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{:10.4} {}] {}",
                    elapsed_secs(),
                    level_tag(record.level()),
                    message
                ))
            }
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path).map_err(LoggerInitError::LogFile)?);
    }

    dispatch.apply().map_err(LoggerInitError::Install)?;

    info!("Logging initialised at {level:?}");
    if let Some(path) = log_file {
        info!("    Log file: {}", path.display());
    }
    Ok(())
}

fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info => "INF",
        log::Level::Warn => "WRN",
        log::Level::Error => "ERR",
    }
}
