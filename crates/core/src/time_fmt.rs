// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact human-readable durations ("45s", "12m", "3h", "2d").

pub fn format_elapsed(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

pub fn format_elapsed_ms(ms: u64) -> String {
    format_elapsed(ms / 1000)
}

/// Whole minutes elapsed between two epoch-ms instants, rounding down.
pub fn elapsed_minutes(from_ms: u64, to_ms: u64) -> u64 {
    to_ms.saturating_sub(from_ms) / 60_000
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
