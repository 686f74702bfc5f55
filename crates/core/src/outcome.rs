// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal results of a supervision and the log classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token a job prints to signal that it finished successfully.
pub const SUCCESS_MARKER: &str = "EXIT_CODE_SUCCESS";

/// How a supervision ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure { reason: String },
    TimedOut { elapsed_minutes: u64 },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure { .. } => f.write_str("failure"),
            Outcome::TimedOut { elapsed_minutes } => write!(f, "timed out after {elapsed_minutes}m"),
        }
    }
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Classify raw log text. Total: absent or blank text is a failure.
pub fn classify(logs: Option<&str>) -> Outcome {
    match logs {
        Some(text) if contains_marker(text) => Outcome::Success,
        Some(text) => Outcome::Failure { reason: text.to_string() },
        None => Outcome::Failure { reason: String::new() },
    }
}

fn contains_marker(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    text.to_ascii_uppercase().contains(SUCCESS_MARKER)
}

/// Category of a terminal fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Job identity does not resolve at the provider
    TargetNotFound,
    /// Status check kept failing after the retry budget was spent
    RetriesExhausted,
    /// Job terminated without the success marker
    JobFailed,
    /// Deadline reached before the job terminated
    TimedOut,
    /// Any other activity error
    Activity,
    /// Recorded history does not match what the orchestration asks for
    Nondeterminism,
}

crate::simple_display! {
    FaultKind {
        TargetNotFound => "target_not_found",
        RetriesExhausted => "retries_exhausted",
        JobFailed => "job_failed",
        TimedOut => "timed_out",
        Activity => "activity",
        Nondeterminism => "nondeterminism",
    }
}

/// Terminal failure of an orchestration instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_minutes: Option<u64>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), elapsed_minutes: None }
    }

    pub fn job_failed(logs: &str) -> Self {
        Self::new(FaultKind::JobFailed, format!("logs: {logs}"))
    }

    pub fn timed_out(max_minutes: u32, elapsed_minutes: u64) -> Self {
        Self {
            kind: FaultKind::TimedOut,
            message: format!("Exceeded processing time {max_minutes} minutes."),
            elapsed_minutes: Some(elapsed_minutes),
        }
    }

    /// The outcome this fault represents to a caller.
    pub fn outcome(&self) -> Outcome {
        match self.kind {
            FaultKind::TimedOut => {
                Outcome::TimedOut { elapsed_minutes: self.elapsed_minutes.unwrap_or_default() }
            }
            _ => Outcome::Failure { reason: self.message.clone() },
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
