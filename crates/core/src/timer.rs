// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifiers.
//!
//! A timer ID encodes the task it belongs to, so a fired timer can be routed
//! back to the right instance and generation without extra bookkeeping.

use crate::id::InstanceId;

crate::define_id! {
    /// Unique identifier for a scheduled timer.
    pub struct TimerId("tmr-");
}

impl TimerId {
    /// Timer backing the durable sleep task `seq` of an instance generation.
    pub fn task(instance: &InstanceId, generation: u32, seq: u32) -> Self {
        TimerKind::Task { instance: instance.clone(), generation, seq }.to_timer_id()
    }

    /// Parse this timer ID into a typed `TimerKind`.
    pub fn kind(&self) -> Option<TimerKind> {
        TimerKind::parse(self.as_str())
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        match self.kind()? {
            TimerKind::Task { instance, .. } => Some(instance),
        }
    }
}

/// Parsed representation of a timer ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    Task { instance: InstanceId, generation: u32, seq: u32 },
}

impl TimerKind {
    /// Returns `None` for unrecognized formats.
    pub fn parse(id: &str) -> Option<TimerKind> {
        let rest = id.strip_prefix("task:")?;
        let (rest, seq) = rest.rsplit_once(':')?;
        let (instance, generation) = rest.rsplit_once(':')?;
        if instance.is_empty() {
            return None;
        }
        Some(TimerKind::Task {
            instance: InstanceId::from_string(instance),
            generation: generation.parse().ok()?,
            seq: seq.parse().ok()?,
        })
    }

    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::Task { instance, generation, seq } => {
                TimerId::from_string(format!("task:{instance}:{generation}:{seq}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
