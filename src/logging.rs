//! Log subscriber setup.
//!
//! The terminal belongs to the game while it runs, so every event goes to a log file instead.

use std::{fs, path::Path};

use color_eyre::eyre::{eyre, OptionExt as _, Result, WrapErr as _};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber writing to `path`.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Events are written by a background
/// worker; the returned guard flushes it when dropped and must be kept alive for as long as the
/// game runs.
///
/// # Errors
///
/// This function may return errors if:
/// - The path has no file name
/// - The log file or its directory cannot be created
/// - A global subscriber is already installed
pub fn init(path: &Path) -> Result<WorkerGuard> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_eyre("log file path has no usable file name")?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(directory)
        .wrap_err_with(|| format!("failed to create log directory {}", directory.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {err}"))?;

    Ok(guard)
}
