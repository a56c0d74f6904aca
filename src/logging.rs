//! Logger bootstrap.
//!
//! The library itself only emits through the `log` facade. Hosts that have no
//! logger of their own can call [`init_logging`] once to get stderr output.

use std::fmt;

use flexi_logger::{Logger, LoggerHandle};
use once_cell::sync::OnceCell;

use crate::config::Settings;

static LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    spec: String,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    /// A logger is already running with a different spec.
    AlreadyInitialized { active: String },
    Backend(flexi_logger::FlexiLoggerError),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized { active } => {
                write!(f, "logging already initialized with `{active}`")
            }
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::AlreadyInitialized { .. } => None,
        }
    }
}

/// Start a stderr logger for `spec` (e.g. `info`, `gantt_engine=debug`).
///
/// Calling again with the same spec is a no-op; a different spec is refused.
pub fn init_logging(spec: &str) -> Result<(), LoggingError> {
    let spec = spec.trim();
    let active = LOGGER.get_or_try_init(|| -> Result<ActiveLogger, LoggingError> {
        let handle = Logger::try_with_str(spec)
            .and_then(|logger| logger.log_to_stderr().start())
            .map_err(LoggingError::Backend)?;
        Ok(ActiveLogger {
            spec: spec.to_string(),
            _handle: handle,
        })
    })?;

    if active.spec != spec {
        return Err(LoggingError::AlreadyInitialized {
            active: active.spec.clone(),
        });
    }
    log::debug!("logging initialized with `{spec}`");
    Ok(())
}

/// Start logging at the level saved in the user's settings.
pub fn init_from_settings(settings: &Settings) -> Result<(), LoggingError> {
    init_logging(&settings.log_level)
}
