// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

mod instances;
mod types;

pub use types::{InstanceRecord, PendingTask, PollObservation};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vigil_core::{Event, InstanceId};

/// Materialized state built from WAL operations
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedState {
    /// Every known orchestration instance, keyed by id
    #[serde(default)]
    pub instances: HashMap<String, InstanceRecord>,
}

impl MaterializedState {
    /// Get an instance by exact id or unique prefix.
    ///
    /// The `sup-` type prefix may be omitted.
    pub fn get_instance(&self, id: &str) -> Option<&InstanceRecord> {
        if let Some(record) = self.instances.get(id) {
            return Some(record);
        }
        if let Some(record) = self.instances.get(&format!("{}{id}", InstanceId::PREFIX)) {
            return Some(record);
        }
        let mut matches = self.instances.iter().filter(|(key, _)| {
            key.starts_with(id) || key.strip_prefix(InstanceId::PREFIX).is_some_and(|s| s.starts_with(id))
        });
        match (matches.next(), matches.next()) {
            (Some((_, record)), None) => Some(record),
            _ => None,
        }
    }

    /// Direct children of `id`, oldest first.
    pub fn children_of(&self, id: &str) -> Vec<&InstanceRecord> {
        let mut children: Vec<_> = self
            .instances
            .values()
            .filter(|r| r.parent.as_ref().is_some_and(|p| p.id == id))
            .collect();
        children.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms).then(a.id.cmp(&b.id)));
        children
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn subtree(&self, id: &str) -> Vec<InstanceId> {
        let mut out = Vec::new();
        let mut stack = vec![InstanceId::from_string(id)];
        while let Some(next) = stack.pop() {
            if !self.instances.contains_key(next.as_str()) {
                continue;
            }
            for child in self.children_of(&next).into_iter().rev() {
                stack.push(child.id.clone());
            }
            out.push(next);
        }
        out
    }

    /// The outermost ancestor of `id` (itself when it has no parent).
    pub fn root_of(&self, id: &str) -> Option<InstanceId> {
        let mut current = self.instances.get(id)?;
        while let Some(parent) = current.parent.as_ref() {
            match self.instances.get(parent.id.as_str()) {
                Some(record) => current = record,
                None => break,
            }
        }
        Some(current.id.clone())
    }

    /// Root instances (triggered supervisions), newest first.
    pub fn roots(&self) -> Vec<&InstanceRecord> {
        let mut roots: Vec<_> = self.instances.values().filter(|r| r.parent.is_none()).collect();
        roots.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms).then(a.id.cmp(&b.id)));
        roots
    }

    /// Apply an event to derive state changes.
    ///
    /// # Idempotency Requirement
    ///
    /// **All event handlers MUST be idempotent.** Events are applied once by
    /// the executor for immediate visibility and again when the engine loop
    /// reads them back from the WAL; recovery may replay them a third time.
    ///
    /// - Guard inserts with existence checks
    /// - Guard every transition with the instance's status and generation
    /// - Only count something when the guarded transition actually happens
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::InstanceCreated { .. }
            | Event::TaskScheduled { .. }
            | Event::TaskCompleted { .. }
            | Event::InstanceContinued { .. }
            | Event::InstanceCompleted { .. }
            | Event::InstanceFailed { .. }
            | Event::InstanceCancelled { .. }
            | Event::InstancePurged { .. } => instances::apply(self, event),

            // Signals handled by the runtime; nothing to persist
            Event::TimerFired { .. } | Event::Shutdown | Event::Custom => {}
        }
    }
}

#[cfg(test)]
#[path = "../state_tests/mod.rs"]
mod tests;
