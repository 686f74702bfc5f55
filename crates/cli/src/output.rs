// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting shared by commands.

use clap::ValueEnum;
use serde::Serialize;
use vigil_core::{format_elapsed_ms, InstanceStatus, Outcome};

/// Failure reasons can be whole log dumps; status lines show a prefix.
const REASON_WIDTH: usize = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `data` as pretty JSON, or run `text_fn` for human output.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text_fn(),
    }
    Ok(())
}

/// Operator-facing verdict: `Running`, `Completed`, `Failed(reason)`,
/// `Failed(timeout)` or `Cancelled`.
pub fn status_label(status: InstanceStatus, outcome: Option<&Outcome>) -> String {
    match (status, outcome) {
        (InstanceStatus::Running, _) => "Running".to_string(),
        (InstanceStatus::Completed, _) => "Completed".to_string(),
        (InstanceStatus::Cancelled, _) => "Cancelled".to_string(),
        (InstanceStatus::Failed, Some(Outcome::TimedOut { .. })) => "Failed(timeout)".to_string(),
        (InstanceStatus::Failed, Some(Outcome::Failure { reason })) => {
            format!("Failed({})", short_reason(reason))
        }
        (InstanceStatus::Failed, _) => "Failed".to_string(),
    }
}

fn short_reason(reason: &str) -> String {
    let line = reason.lines().find(|l| !l.trim().is_empty()).unwrap_or_default().trim();
    if line.chars().count() > REASON_WIDTH {
        let cut: String = line.chars().take(REASON_WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

/// Relative time of an instant: "5m ago", "in 2h", or "-" when unknown.
pub fn format_relative_to(epoch_ms: Option<u64>, now_ms: u64) -> String {
    match epoch_ms {
        None | Some(0) => "-".to_string(),
        Some(at) if at > now_ms => format!("in {}", format_elapsed_ms(at - now_ms)),
        Some(at) => format!("{} ago", format_elapsed_ms(now_ms - at)),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
