#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup shared by the chia-rpc crates and the `chia-rpc` binary.
//!
//! Library crates only emit `tracing` events. Binaries call [`init`] once to
//! install a formatted subscriber; `RUST_LOG` takes precedence over the level
//! passed in, so the node's configured level is only a default.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file could not be opened for appending
    #[error("Failed to open log file: {0}")]
    File(#[from] std::io::Error),
    /// The level or `RUST_LOG` directive did not parse
    #[error("Invalid log filter: {0}")]
    Filter(String),
    /// A global subscriber was already installed
    #[error("Logging already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Builds the filter: `RUST_LOG` when set and non-empty, else `level`.
pub fn filter_for(level: &str) -> Result<EnvFilter, LoggingError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() =>
            EnvFilter::try_new(directives).map_err(|e| LoggingError::Filter(e.to_string())),
        _ => EnvFilter::try_new(level).map_err(|e| LoggingError::Filter(e.to_string())),
    }
}

/// Installs the global fmt subscriber, writing to stderr or appending to `file`.
pub fn init(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
    let filter = filter_for(level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| LoggingError::AlreadyInitialised(e.to_string()))
}

/// Emits a trace event tagged with the calling module.
pub fn trace(module: &str, msg: &str) {
    tracing::trace!(module = module, "{}", msg);
}
