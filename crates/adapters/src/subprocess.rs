// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess helpers with timeouts

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Budget for `az` CLI invocations (token and subscription lookups)
pub const AZ_CLI_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a command to completion, killing it if it outlives `timeout`.
///
/// `label` names the command in error messages.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(format!("{label} failed to run: {e}")),
        Err(_) => Err(format!("{label} timed out after {}s", timeout.as_secs())),
    }
}

/// Trimmed stderr of a failed command, or its exit status when stderr is empty.
pub fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
