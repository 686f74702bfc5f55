// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable timer wheel.
//!
//! Timers are keyed by id and armed at absolute epoch milliseconds, so a
//! timer re-armed after a restart fires at its original time (immediately
//! when overdue).

use std::collections::HashMap;
use vigil_core::{Event, InstanceId, TimerId, TimerKind};

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<String, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) a timer.
    pub fn set_timer(&mut self, id: String, fire_at_ms: u64) {
        self.timers.insert(id, fire_at_ms);
    }

    pub fn cancel_timer(&mut self, id: &str) {
        self.timers.remove(id);
    }

    /// Remove and return every timer due at `now_ms`, earliest first.
    pub fn fired_timers(&mut self, now_ms: u64) -> Vec<Event> {
        let mut due: Vec<(String, u64)> = self
            .timers
            .iter()
            .filter(|(_, at)| **at <= now_ms)
            .map(|(id, at)| (id.clone(), *at))
            .collect();
        due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        due.into_iter()
            .map(|(id, _)| {
                self.timers.remove(&id);
                Event::TimerFired { id: TimerId::from_string(id) }
            })
            .collect()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().min().copied()
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Ids of the armed timers owned by `instance`.
    pub fn timers_for(&self, instance: &InstanceId) -> Vec<TimerId> {
        let mut ids: Vec<TimerId> = self
            .timers
            .keys()
            .filter(|id| {
                matches!(TimerKind::parse(id), Some(TimerKind::Task { instance: owner, .. }) if &owner == instance)
            })
            .map(|id| TimerId::from_string(id.as_str()))
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
