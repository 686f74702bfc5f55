// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon log setup: `RUST_LOG`-filtered output to `daemon.log`.

use std::io::Write;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::lifecycle::LifecycleError;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Route tracing output to `log_path` through a background writer.
///
/// The returned guard flushes buffered lines when dropped; keep it alive
/// for the life of the process.
pub fn init(log_path: &Path) -> Result<WorkerGuard, LifecycleError> {
    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = log_path.file_name().ok_or(LifecycleError::NoStateDir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| LifecycleError::Runtime(e.to_string()))?;
    Ok(guard)
}

/// Mark the start of a daemon run so the CLI can find this run's startup error.
pub fn write_startup_marker(log_path: &Path) -> std::io::Result<()> {
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "{}{}) ---\n", STARTUP_MARKER_PREFIX, std::process::id())
}

/// Prefix of the line written by [`write_startup_marker`]
pub const STARTUP_MARKER_PREFIX: &str = "--- vigild: starting (pid: ";

/// Message logged when startup fails; the CLI reports what follows it
pub const STARTUP_ERROR: &str = "Failed to start daemon: ";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
