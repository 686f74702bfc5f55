// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deciding and applying the next step of an instance

use super::Runtime;
use crate::error::RuntimeError;
use crate::orchestration::{decide, DecisionContext, Step};
use vigil_adapters::JobControl;
use vigil_core::{
    Activity, Clock, Effect, Event, InstanceStatus, ParentLink, Task, TaskResult, TimerId,
};
use vigil_storage::InstanceRecord;

/// Logical time of a record: completion of its latest result.
fn logical_now(record: &InstanceRecord) -> u64 {
    record.history.last().map_or(record.generation_started_at_ms, |r| r.completed_at_ms)
}

impl<J, C> Runtime<J, C>
where
    J: JobControl,
    C: Clock,
{
    /// Run the decision for `id` and apply the resulting step.
    pub(crate) async fn advance(&self, id: &str, replaying: bool) -> Result<Vec<Event>, RuntimeError> {
        let Some(record) = self.running(id) else {
            return Ok(vec![]);
        };

        let step = decide(&DecisionContext {
            instance_id: &record.id,
            input: &record.input,
            generation: record.generation,
            generation_started_at_ms: record.generation_started_at_ms,
            history: &record.history,
            pending: record.pending.as_ref().map(|p| p.seq),
            is_replaying: replaying,
        });
        tracing::debug!(
            instance = %record.id,
            generation = record.generation,
            history = record.history.len(),
            step = step.name(),
            "decided"
        );

        self.apply_step(&record, step).await
    }

    async fn apply_step(&self, record: &InstanceRecord, step: Step) -> Result<Vec<Event>, RuntimeError> {
        let at_ms = logical_now(record);
        let id = record.id.clone();
        let effects = match step {
            Step::Wait => return Ok(vec![]),

            Step::Schedule(task) => {
                if record.pending.is_some() {
                    return Ok(vec![]);
                }
                let seq = record.history.len() as u32;
                let mut effects = vec![Effect::Emit {
                    event: Event::TaskScheduled {
                        id,
                        generation: record.generation,
                        seq,
                        task: task.clone(),
                    },
                }];
                effects.extend(self.dispatch(record, seq, &task));
                effects
            }

            Step::ContinueAsNew(input) => vec![Effect::Emit {
                event: Event::InstanceContinued {
                    id,
                    generation: record.generation + 1,
                    input,
                    at_ms,
                },
            }],

            Step::Complete(outcome) => {
                if record.parent.is_none() {
                    tracing::info!(instance = %id, %outcome, "supervision finished");
                }
                vec![Effect::Emit { event: Event::InstanceCompleted { id, outcome, at_ms } }]
            }

            Step::Fail(fault) => {
                tracing::warn!(instance = %id, kind = %fault.kind, message = %fault.message, "instance failed");
                vec![Effect::Emit { event: Event::InstanceFailed { id, fault, at_ms } }]
            }
        };

        Ok(self.executor.execute_all(effects).await?)
    }

    /// Effects that carry out `task` (already recorded as pending at `seq`).
    pub(crate) fn dispatch(&self, record: &InstanceRecord, seq: u32, task: &Task) -> Vec<Effect> {
        let request = record.input.request();
        match task {
            Task::Activity { activity, retry } => vec![Effect::CallActivity {
                instance: record.id.clone(),
                generation: record.generation,
                seq,
                activity: *activity,
                target: request.target.clone(),
                retry: *retry,
                container: match activity {
                    Activity::GetLogs => {
                        request.tuning.container_policy.log_container().map(str::to_string)
                    }
                    _ => None,
                },
                settle: request.tuning.settle_delay,
            }],

            Task::Timer { fire_at_ms } => vec![Effect::SetTimer {
                id: TimerId::task(&record.id, record.generation, seq),
                fire_at_ms: *fire_at_ms,
            }],

            Task::SubOrchestration { child_id, input } => {
                let existing = self.state.lock().instances.get(child_id.as_str()).cloned();
                match existing {
                    Some(child) if child.is_terminal() => child_result(&child)
                        .map(|result| Effect::Emit {
                            event: Event::TaskCompleted {
                                id: record.id.clone(),
                                generation: record.generation,
                                seq,
                                completed_at_ms: child.finished_at_ms.unwrap_or(logical_now(record)),
                                result,
                            },
                        })
                        .into_iter()
                        .collect(),
                    Some(_) => vec![],
                    None => vec![Effect::Emit {
                        event: Event::InstanceCreated {
                            id: child_id.clone(),
                            kind: input.kind(),
                            input: input.clone(),
                            parent: Some(ParentLink {
                                id: record.id.clone(),
                                generation: record.generation,
                                seq,
                            }),
                            created_at_ms: logical_now(record),
                        },
                    }],
                }
            }
        }
    }
}

/// What a finished child reports to its parent. Cancelled children report nothing.
pub(super) fn child_result(child: &InstanceRecord) -> Option<TaskResult> {
    let result = match child.status {
        InstanceStatus::Completed => Ok(child.outcome.clone()?),
        InstanceStatus::Failed => Err(child.fault.clone()?),
        InstanceStatus::Running | InstanceStatus::Cancelled => return None,
    };
    Some(TaskResult::ChildFinished { result })
}
