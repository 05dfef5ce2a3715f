use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "DEPLOYKIT_LOG";

/// `deploykit-<command>-<YYYYMMDD-HHMMSS>.log` inside `dir`
pub fn log_file_path(dir: &Path, command: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("deploykit-{}-{}.log", command, stamp))
}

/// Install the global subscriber: stderr always, plus a log file when
/// `log_dir` is set. Returns the log file path.
///
/// A subscriber that is already installed (repeated in-process runs) is kept
/// and no log file is created.
pub fn init(command: &str, verbose: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("Log subscriber already installed; not opening a new log file");
        return Ok(None);
    }

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, path) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let path = log_file_path(dir, command);
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = installed {
        // Lost a race with another subscriber; the file would stay empty
        if let Some(path) = &path {
            let _ = std::fs::remove_file(path);
        }
        tracing::debug!("Log subscriber not installed: {}", e);
        return Ok(None);
    }

    Ok(path)
}
