use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;
use crate::error::{PipelineError, Result};

/// Install the global subscriber: bracketed lines to stdout and to
/// `<log_dir>/<run_name>_<timestamp>.log`. Returns the log file path.
pub fn setup_logging(log_dir: &Path, run_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(log_dir).map_err(|source| PipelineError::Io {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("{}_{}.log", run_name, timestamp));

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .map_err(|source| PipelineError::Io {
            path: log_path.clone(),
            source,
        })?;

    let file_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(file_layer)
        .with(stdout_layer)
        .init();

    info!("Starting {}", run_name);
    info!("Log file created at: {:?}", log_path);

    Ok(log_path)
}
