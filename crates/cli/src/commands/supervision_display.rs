// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for supervision status and listings.

use std::io::{self, Write};

use vigil_core::{Clock, SystemClock};
use vigil_wire::{InstanceDetail, InstanceSummary};

use crate::color;
use crate::output::{format_relative_to, status_label};

pub(crate) fn print_detail(out: &mut impl Write, detail: &InstanceDetail) -> io::Result<()> {
    write_detail(out, detail, SystemClock.epoch_ms())
}

pub(crate) fn write_detail(
    out: &mut impl Write,
    d: &InstanceDetail,
    now_ms: u64,
) -> io::Result<()> {
    let label = status_label(d.status, d.outcome.as_ref());
    writeln!(out, "{}  {}", color::header(&d.id), color::status(&label, d.status))?;
    writeln!(out, "  target:     {}", d.target)?;
    writeln!(
        out,
        "  policy:     every {}m, up to {}m",
        d.polling_interval_minutes, d.max_processing_time_minutes
    )?;
    writeln!(out, "  generation: {} ({} status checks)", d.generation, d.polls)?;
    writeln!(out, "  deadline:   {}", format_relative_to(d.deadline_ms, now_ms))?;

    let last_poll = format_relative_to(d.last_poll_at_ms, now_ms);
    match (&d.last_state, d.last_poll_at_ms) {
        (Some(state), Some(_)) => writeln!(out, "  last poll:  {last_poll} ({state})")?,
        (None, Some(_)) => writeln!(out, "  last poll:  {last_poll} (not found)")?,
        _ => writeln!(out, "  last poll:  -")?,
    }
    writeln!(out, "  created:    {}", format_relative_to(Some(d.created_at_ms), now_ms))?;
    if d.finished_at_ms.is_some() {
        writeln!(out, "  finished:   {}", format_relative_to(d.finished_at_ms, now_ms))?;
    }
    if let Some(fault) = &d.fault {
        writeln!(out, "  fault:      {}", color::muted(&fault.to_string()))?;
    }
    Ok(())
}

pub(crate) fn print_summaries(out: &mut impl Write, items: &[InstanceSummary]) -> io::Result<()> {
    write_summaries(out, items, SystemClock.epoch_ms())
}

pub(crate) fn write_summaries(
    out: &mut impl Write,
    items: &[InstanceSummary],
    now_ms: u64,
) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "No supervisions");
    }
    let id_width = items.iter().map(|i| i.id.len()).max().unwrap_or(2).max(2);
    let target_width = items.iter().map(|i| i.target.len()).max().unwrap_or(6).max(6);
    writeln!(out, "{:id_width$}  {:target_width$}  {:<20}  CREATED", "ID", "TARGET", "STATUS")?;
    for item in items {
        let label = status_label(item.status, item.outcome.as_ref());
        // Pad before coloring so escape codes do not skew the columns.
        let padded = format!("{label:<20}");
        writeln!(
            out,
            "{:id_width$}  {:target_width$}  {}  {}",
            item.id,
            item.target,
            color::status(&padded, item.status),
            format_relative_to(Some(item.created_at_ms), now_ms),
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "supervision_display_tests.rs"]
mod tests;
