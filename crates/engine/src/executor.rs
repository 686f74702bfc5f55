// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::{activity, scheduler::Scheduler, RuntimeDeps};
use std::sync::Arc;
use vigil_adapters::JobControl;
use vigil_core::{Clock, Effect, Event, TaskResult};
use vigil_storage::MaterializedState;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("event channel closed")]
    ChannelClosed,
}

/// Executes effects using the configured job-control backend
pub struct Executor<J, C: Clock> {
    jobs: J,
    state: Arc<Mutex<MaterializedState>>,
    scheduler: Arc<Mutex<Scheduler>>,
    clock: C,
    /// Channel for activity results produced by background tasks
    event_tx: mpsc::Sender<Event>,
}

impl<J, C> Executor<J, C>
where
    J: JobControl,
    C: Clock,
{
    pub fn new(
        deps: RuntimeDeps<J>,
        scheduler: Arc<Mutex<Scheduler>>,
        clock: C,
        event_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self { jobs: deps.jobs, state: deps.state, scheduler, clock, event_tx }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> Arc<Mutex<MaterializedState>> {
        Arc::clone(&self.state)
    }

    /// Execute a single effect with tracing
    ///
    /// Returns an optional event that should be written to the WAL.
    pub async fn execute(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        let info = effect
            .fields()
            .into_iter()
            .map(|(key, val)| format!("{key}={val}"))
            .collect::<Vec<_>>()
            .join(" ");

        let op = effect.name();
        let verbose = effect.verbose();
        if verbose {
            tracing::info!("executing effect={} {}", op, info);
        }

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match (&result, verbose) {
            (Ok(event), true) => tracing::info!(event = event.is_some(), elapsed_ms, "completed"),
            (Ok(event), false) => tracing::debug!(
                event = event.is_some(),
                elapsed_ms,
                "executed effect={} {}",
                op,
                info
            ),
            (Err(e), _) => tracing::error!(error = %e, elapsed_ms, "error effect={} {}", op, info),
        }

        result
    }

    /// Execute a batch of effects in order, collecting events for the WAL.
    pub async fn execute_all(&self, effects: Vec<Effect>) -> Result<Vec<Event>, ExecuteError> {
        let mut events = Vec::new();
        for effect in effects {
            if let Some(event) = self.execute(effect).await? {
                events.push(event);
            }
        }
        Ok(events)
    }

    async fn execute_inner(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        match effect {
            Effect::Emit { event } => {
                // Apply immediately so the next decision sees it
                self.state.lock().apply_event(&event);
                Ok(Some(event))
            }

            Effect::CallActivity {
                instance,
                generation,
                seq,
                activity,
                target,
                retry,
                container,
                settle,
            } => {
                if self.event_tx.is_closed() {
                    return Err(ExecuteError::ChannelClosed);
                }
                let jobs = self.jobs.clone();
                let clock = self.clock.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let output = activity::run(
                        &jobs,
                        activity,
                        &target,
                        container.as_deref(),
                        retry,
                        settle,
                    )
                    .await;
                    let event = Event::TaskCompleted {
                        id: instance,
                        generation,
                        seq,
                        completed_at_ms: clock.epoch_ms(),
                        result: TaskResult::Activity { output },
                    };
                    if let Err(e) = event_tx.send(event).await {
                        tracing::error!("failed to send activity result: {}", e);
                    }
                });
                Ok(None)
            }

            Effect::SetTimer { id, fire_at_ms } => {
                self.scheduler.lock().set_timer(id.to_string(), fire_at_ms);
                Ok(None)
            }

            Effect::CancelTimer { id } => {
                self.scheduler.lock().cancel_timer(id.as_str());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
