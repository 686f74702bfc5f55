// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervision runtime

mod advance;
mod handlers;

use crate::error::RuntimeError;
use crate::executor::Executor;
use crate::scheduler::Scheduler;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use vigil_adapters::JobControl;
use vigil_core::{Clock, Event};
use vigil_storage::{InstanceRecord, MaterializedState};

/// Runtime dependencies
pub struct RuntimeDeps<J> {
    pub jobs: J,
    pub state: Arc<Mutex<MaterializedState>>,
}

/// Drives orchestration instances from events.
///
/// Every handler reads the materialized state, decides, and returns the
/// events it emitted. Emitted events are already applied to state; the
/// caller persists them and feeds them back through [`Runtime::handle_event`].
pub struct Runtime<J, C: Clock> {
    pub executor: Executor<J, C>,
    state: Arc<Mutex<MaterializedState>>,
    scheduler: Arc<Mutex<Scheduler>>,
}

impl<J, C> Runtime<J, C>
where
    J: JobControl,
    C: Clock,
{
    pub fn new(deps: RuntimeDeps<J>, clock: C, event_tx: mpsc::Sender<Event>) -> Self {
        let state = Arc::clone(&deps.state);
        let scheduler = Arc::new(Mutex::new(Scheduler::new()));
        Self {
            executor: Executor::new(deps, Arc::clone(&scheduler), clock, event_tx),
            state,
            scheduler,
        }
    }

    pub fn clock(&self) -> &C {
        self.executor.clock()
    }

    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }

    pub fn state(&self) -> Arc<Mutex<MaterializedState>> {
        Arc::clone(&self.state)
    }

    /// Snapshot of one instance (exact id or unique prefix).
    pub fn instance(&self, id: &str) -> Option<InstanceRecord> {
        self.state.lock().get_instance(id).cloned()
    }

    /// Clone of a running instance, or `None` when unknown or finished.
    fn running(&self, id: &str) -> Option<InstanceRecord> {
        self.state.lock().instances.get(id).filter(|r| !r.is_terminal()).cloned()
    }

    pub async fn handle_event(&self, event: Event) -> Result<Vec<Event>, RuntimeError> {
        match &event {
            Event::InstanceCreated { id, .. } | Event::InstanceContinued { id, .. } => {
                self.advance(id, false).await
            }

            Event::TaskCompleted { id, generation, .. } => {
                let current = self.running(id).is_some_and(|r| r.generation == *generation);
                if !current {
                    tracing::debug!(instance = %id, generation, "ignoring stale task result");
                    return Ok(vec![]);
                }
                self.advance(id, false).await
            }

            Event::TimerFired { id } => self.handle_timer(id).await,

            Event::InstanceCompleted { id, .. } | Event::InstanceFailed { id, .. } => {
                self.notify_parent(id).await
            }

            Event::InstanceCancelled { id, .. } => self.cancel_timers(id).await,

            Event::TaskScheduled { .. }
            | Event::InstancePurged { .. }
            | Event::Shutdown
            | Event::Custom => Ok(vec![]),
        }
    }

    /// Re-issue the in-flight work of every running instance after a restart.
    ///
    /// Pending activities are dispatched again and pending timers re-armed.
    /// Instances with nothing in flight are re-decided from their history.
    pub async fn resume_pending(&self) -> Result<Vec<Event>, RuntimeError> {
        let mut running: Vec<InstanceRecord> = {
            let state = self.state.lock();
            state.instances.values().filter(|r| !r.is_terminal()).cloned().collect()
        };
        running.sort_by(|a, b| a.id.cmp(&b.id));

        let mut events = Vec::new();
        for record in running {
            match &record.pending {
                Some(pending) => {
                    tracing::info!(
                        instance = %record.id,
                        generation = record.generation,
                        seq = pending.seq,
                        task = %pending.task,
                        "resuming pending task"
                    );
                    let effects = self.dispatch(&record, pending.seq, &pending.task);
                    events.extend(self.executor.execute_all(effects).await?);
                }
                None => events.extend(self.advance(&record.id, true).await?),
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
