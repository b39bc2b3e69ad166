//! Logging setup
//!
//! Logs go to a daily rolling file rather than the terminal, so diagnostics
//! never interleave with the chat transcript printed by the console.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::core::{ChatError, ChatResult};

/// File name prefix of the rolling log files
pub const LOG_FILE_PREFIX: &str = "workmind-chat.log";

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Keep the returned
/// guard alive for the life of the process; dropping it flushes and stops the
/// background writer.
pub fn init_logging(config: &LoggingConfig) -> ChatResult<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(&config.log_dir)
        .map_err(|e| {
            ChatError::other(format!(
                "Failed to open log directory {:?}: {}",
                config.log_dir, e
            ))
        })?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ChatError::other(format!("Failed to install logger: {}", e)))?;

    tracing::info!("Logging to {:?}", config.log_dir);
    Ok(guard)
}
