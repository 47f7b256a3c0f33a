//! Logging setup.
//!
//! Structured logging via the `tracing` crate with configurable level,
//! output format, and destination. The decode-failure side channel of
//! the parser and the discovery warnings of the registry all flow
//! through here.

use crate::error::LibraryError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Resolve the log file path with precedence: explicit, `QUILL_LOG_FILE`
/// env, config file, platform state directory default.
pub fn resolve_log_file_path(
    explicit: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, LibraryError> {
    if let Some(path) = explicit {
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }
    if let Ok(env_path) = std::env::var("QUILL_LOG_FILE") {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(path) = config_file {
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }
    let project_dirs = directories::ProjectDirs::from("", "quill", "quill").ok_or_else(|| {
        LibraryError::Config("could not determine platform state directory for log file".to_string())
    })?;
    let state_dir = project_dirs
        .state_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project_dirs.data_local_dir().to_path_buf());
    Ok(state_dir.join("quill.log"))
}

/// Install the global tracing subscriber.
///
/// `level` falls back to the `RUST_LOG` environment filter, then `info`.
/// With a log file, output is appended there without ANSI escapes;
/// otherwise it goes to stderr.
pub fn init_logging(
    level: Option<&str>,
    json: bool,
    log_file: Option<&Path>,
) -> Result<(), LibraryError> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| LibraryError::Config(format!("invalid log level '{level}': {e}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let registry = tracing_subscriber::registry().with(filter);
    let timer = ChronoUtc::rfc_3339();

    let result = match (json, log_file) {
        (false, None) => registry
            .with(fmt::layer().with_timer(timer).with_writer(std::io::stderr))
            .try_init(),
        (true, None) => registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(timer)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (false, Some(path)) => {
            let file = open_log_file(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_timer(timer)
                        .with_writer(Arc::new(file)),
                )
                .try_init()
        }
        (true, Some(path)) => {
            let file = open_log_file(path)?;
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_timer(timer)
                        .with_writer(Arc::new(file)),
                )
                .try_init()
        }
    };
    result.map_err(|e| LibraryError::Config(format!("failed to install subscriber: {e}")))
}

fn open_log_file(path: &Path) -> Result<std::fs::File, LibraryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            LibraryError::Config(format!(
                "failed to create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LibraryError::Config(format!("failed to open log file {}: {e}", path.display())))
}
