// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer, child-completion, and cancellation handling

use super::advance::child_result;
use super::Runtime;
use crate::error::RuntimeError;
use vigil_adapters::JobControl;
use vigil_core::{Clock, Effect, Event, TaskResult, TimerId, TimerKind};

impl<J, C> Runtime<J, C>
where
    J: JobControl,
    C: Clock,
{
    /// Record a fired durable timer as the result of the task it backs.
    pub(crate) async fn handle_timer(&self, id: &TimerId) -> Result<Vec<Event>, RuntimeError> {
        let Some(TimerKind::Task { instance, generation, seq }) = id.kind() else {
            tracing::warn!(timer_id = %id, "ignoring unrecognized timer");
            return Ok(vec![]);
        };

        let pending = self.running(&instance).is_some_and(|r| r.is_pending(generation, seq));
        if !pending {
            tracing::debug!(timer_id = %id, "timer no longer pending");
            return Ok(vec![]);
        }

        let event = Event::TaskCompleted {
            id: instance,
            generation,
            seq,
            completed_at_ms: self.clock().epoch_ms(),
            result: TaskResult::TimerFired,
        };
        Ok(self.executor.execute(Effect::Emit { event }).await?.into_iter().collect())
    }

    /// Deliver a finished child's result to the parent task waiting on it.
    pub(crate) async fn notify_parent(&self, id: &str) -> Result<Vec<Event>, RuntimeError> {
        let event = {
            let state = self.state.lock();
            let Some(child) = state.instances.get(id) else {
                return Ok(vec![]);
            };
            let Some(link) = child.parent.clone() else {
                return Ok(vec![]);
            };
            let waiting = state
                .instances
                .get(link.id.as_str())
                .is_some_and(|p| !p.is_terminal() && p.is_pending(link.generation, link.seq));
            let Some(result) = child_result(child).filter(|_| waiting) else {
                return Ok(vec![]);
            };
            Event::TaskCompleted {
                id: link.id,
                generation: link.generation,
                seq: link.seq,
                completed_at_ms: child.finished_at_ms.unwrap_or(child.generation_started_at_ms),
                result,
            }
        };
        Ok(self.executor.execute(Effect::Emit { event }).await?.into_iter().collect())
    }

    /// Disarm every timer held by a cancelled instance tree.
    pub(crate) async fn cancel_timers(&self, id: &str) -> Result<Vec<Event>, RuntimeError> {
        let members = self.state.lock().subtree(id);
        let timers: Vec<TimerId> = {
            let scheduler = self.scheduler.lock();
            members.iter().flat_map(|m| scheduler.timers_for(m)).collect()
        };
        for timer in timers {
            self.executor.execute(Effect::CancelTimer { id: timer }).await?;
        }
        tracing::info!(instance = %id, members = members.len(), "supervision cancelled");
        Ok(vec![])
    }
}
