//! Structured logging setup.
//!
//! Installs a `tracing` subscriber according to [`LoggingConfig`]: level
//! from config (overridable via `RUST_LOG`), console output by default,
//! file output when a path is configured.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};

/// Install the global tracing subscriber.
///
/// When `log_file_path` is set the file takes over as the output; ANSI
/// colors are disabled for file output. Fails if a subscriber is already
/// installed or the log file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match &config.log_file_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    ProtocolError::ConfigError(format!("Failed to open log file '{path}': {e}"))
                })?;

            builder
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => builder.try_init(),
    };

    installed
        .map_err(|e| ProtocolError::ConfigError(format!("Failed to install subscriber: {e}")))
}
