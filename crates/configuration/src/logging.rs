//! Logging infrastructure.
//!
//! Installs the global `tracing` subscriber once, at the binary edge. Library
//! crates only emit events and spans; where they end up is decided here.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ConfigError;
use crate::settings::LoggingSettings;

/// File name prefix of the rolling log files.
const LOG_FILE_PREFIX: &str = "personnel.log";

/// Initializes console logging, plus a daily rolling file when a directory is configured.
///
/// `RUST_LOG` overrides the configured level. The returned guard flushes the
/// file writer on drop, so `main` must hold on to it for the process lifetime.
pub fn init_logging(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| {
            ConfigError::LoggingError(format!("invalid log level '{}': {}", settings.level, e))
        })?;

    let console_layer = if settings.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = match settings.directory.as_deref() {
        Some(dir) => {
            std::fs::create_dir_all(Path::new(dir)).map_err(|e| {
                ConfigError::LoggingError(format!("cannot create log directory '{}': {}", dir, e))
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    Ok(guard)
}
