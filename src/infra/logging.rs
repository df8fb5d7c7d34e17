use std::fs::OpenOptions;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError};

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process when `file` logging is configured.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|error| AppError::LoggingInit(Box::new(error)))?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(AppError::LoggingInit)?;

            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(AppError::LoggingInit)?;

            Ok(None)
        }
    }
}
