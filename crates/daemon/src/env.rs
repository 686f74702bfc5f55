// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: VIGIL_STATE_DIR > XDG_STATE_HOME/vigil > ~/.local/state/vigil
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("VIGIL_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("vigil"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/vigil"))
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    duration_ms("VIGIL_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// How often the engine loop checks for due timers
pub fn timer_check() -> Duration {
    duration_ms("VIGIL_TIMER_CHECK_MS").unwrap_or(Duration::from_secs(1))
}

/// How often state is checkpointed and the WAL truncated
pub fn checkpoint_interval() -> Duration {
    duration_ms("VIGIL_CHECKPOINT_INTERVAL_MS").unwrap_or(Duration::from_secs(60))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
