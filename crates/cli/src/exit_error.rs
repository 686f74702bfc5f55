// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error carrying a process exit code out of a command.
//!
//! `vigil status --wait` exits with the supervision's verdict so scripts can
//! branch on it; `main()` turns this error into the process exit status.

use std::fmt;

use vigil_core::InstanceStatus;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    /// Printed to stderr when non-empty
    pub message: String,
}

impl ExitError {
    /// Supervision ended in failure (job failed, timed out, not found)
    pub const FAILED: i32 = 1;
    /// Supervision was cancelled by an operator
    pub const CANCELLED: i32 = 3;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Exit status for a finished supervision, `None` when it succeeded or
    /// is still running.
    pub fn for_status(status: InstanceStatus) -> Option<Self> {
        match status {
            InstanceStatus::Failed => Some(Self::new(Self::FAILED, "")),
            InstanceStatus::Cancelled => Some(Self::new(Self::CANCELLED, "")),
            InstanceStatus::Running | InstanceStatus::Completed => None,
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "exit status {}", self.code)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for ExitError {}
