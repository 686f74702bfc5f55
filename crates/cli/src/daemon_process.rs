// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning and stopping the `vigild` process.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use vigil_daemon::lifecycle::{LOG_FILE, SOCKET_FILE};
use vigil_daemon::logging::{STARTUP_ERROR, STARTUP_MARKER_PREFIX};

use crate::client::{ClientError, DaemonClient};

const START_TIMEOUT: Duration = Duration::from_secs(5);
const STOP_TIMEOUT: Duration = Duration::from_secs(5);
const POLL: Duration = Duration::from_millis(50);

/// Locate the daemon binary: `VIGIL_DAEMON_BINARY`, then next to this
/// executable, then `PATH`.
pub fn find_vigild_binary() -> PathBuf {
    if let Ok(path) = std::env::var("VIGIL_DAEMON_BINARY") {
        return PathBuf::from(path);
    }
    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("vigild")))
        .filter(|path| path.exists());
    sibling.unwrap_or_else(|| PathBuf::from("vigild"))
}

/// Spawn the daemon detached and wait until it answers a ping.
pub async fn start_background(state_dir: &Path) -> Result<(), ClientError> {
    let mut child = Command::new(find_vigild_binary())
        .env("VIGIL_STATE_DIR", state_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(format!("could not run vigild: {e}")))?;

    let client = DaemonClient::at(state_dir.join(SOCKET_FILE));
    let deadline = tokio::time::Instant::now() + START_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if client.ping().await.is_ok() {
            return Ok(());
        }
        if let Ok(Some(status)) = child.try_wait() {
            return Err(ClientError::DaemonStartFailed(
                startup_error(state_dir).unwrap_or_else(|| format!("vigild exited with {status}")),
            ));
        }
        tokio::time::sleep(POLL).await;
    }
    Err(ClientError::DaemonStartFailed(
        startup_error(state_dir).unwrap_or_else(|| "timed out waiting for vigild".to_string()),
    ))
}

/// Ask the daemon to stop and wait for its socket to go away.
///
/// Returns `false` when no daemon was running.
pub async fn stop() -> Result<bool, ClientError> {
    let client = match DaemonClient::connect() {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning) => return Ok(false),
        Err(e) => return Err(e),
    };
    match client.shutdown().await {
        Ok(()) => {}
        Err(ClientError::DaemonNotRunning) => return Ok(false),
        Err(e) => return Err(e),
    }

    let deadline = tokio::time::Instant::now() + STOP_TIMEOUT;
    while client.socket_path().exists() {
        if tokio::time::Instant::now() >= deadline {
            return Err(ClientError::Timeout(STOP_TIMEOUT));
        }
        tokio::time::sleep(POLL).await;
    }
    Ok(true)
}

fn startup_error(state_dir: &Path) -> Option<String> {
    let log = std::fs::read_to_string(state_dir.join(LOG_FILE)).ok()?;
    parse_startup_error(&log)
}

/// The startup error of the most recent daemon run recorded in `log`.
pub(crate) fn parse_startup_error(log: &str) -> Option<String> {
    let last_run = &log[log.rfind(STARTUP_MARKER_PREFIX)?..];
    last_run
        .lines()
        .filter(|line| line.contains("ERROR"))
        .find_map(|line| line.split_once(STARTUP_ERROR).map(|(_, msg)| msg.trim().to_string()))
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
