// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance lifecycle event handlers

use super::types::{InstanceRecord, PendingTask, PollObservation};
use super::MaterializedState;
use vigil_core::{ActivityOutput, Event, InstanceStatus, TaskRecord, TaskResult};

pub(super) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::InstanceCreated { id, kind, input, parent, created_at_ms } => {
            if state.instances.contains_key(id.as_str()) {
                return;
            }
            state.instances.insert(
                id.to_string(),
                InstanceRecord {
                    id: id.clone(),
                    kind: *kind,
                    input: input.clone(),
                    parent: parent.clone(),
                    created_at_ms: *created_at_ms,
                    generation: 0,
                    generation_started_at_ms: *created_at_ms,
                    history: Vec::new(),
                    pending: None,
                    status: InstanceStatus::Running,
                    outcome: None,
                    fault: None,
                    finished_at_ms: None,
                    last_poll: None,
                    polls: 0,
                },
            );
        }

        Event::TaskScheduled { id, generation, seq, task } => {
            with_running(state, id, |record| {
                if record.generation != *generation
                    || record.pending.is_some()
                    || *seq as usize != record.history.len()
                {
                    return;
                }
                record.pending = Some(PendingTask { seq: *seq, task: task.clone() });
            });
        }

        Event::TaskCompleted { id, generation, seq, completed_at_ms, result } => {
            with_running(state, id, |record| {
                if record.generation != *generation || *seq as usize != record.history.len() {
                    return;
                }
                record.history.push(TaskRecord {
                    seq: *seq,
                    completed_at_ms: *completed_at_ms,
                    result: result.clone(),
                });
                if record.pending.as_ref().is_some_and(|p| p.seq == *seq) {
                    record.pending = None;
                }
                if let TaskResult::Activity { output: Ok(ActivityOutput::Status(snapshot)) } = result
                {
                    record.polls += 1;
                    record.last_poll = Some(PollObservation {
                        at_ms: *completed_at_ms,
                        lead_state: snapshot.as_ref().and_then(|s| s.lead_state()).map(str::to_string),
                        found: snapshot.is_some(),
                    });
                }
            });
        }

        Event::InstanceContinued { id, generation, input, at_ms } => {
            with_running(state, id, |record| {
                if *generation != record.generation + 1 {
                    return;
                }
                record.generation = *generation;
                record.input = input.clone();
                record.history.clear();
                record.pending = None;
                record.generation_started_at_ms = *at_ms;
            });
        }

        Event::InstanceCompleted { id, outcome, at_ms } => {
            with_running(state, id, |record| {
                record.status = InstanceStatus::Completed;
                record.outcome = Some(outcome.clone());
                record.pending = None;
                record.finished_at_ms = Some(*at_ms);
            });
        }

        Event::InstanceFailed { id, fault, at_ms } => {
            with_running(state, id, |record| {
                record.status = InstanceStatus::Failed;
                record.outcome = Some(fault.outcome());
                record.fault = Some(fault.clone());
                record.pending = None;
                record.finished_at_ms = Some(*at_ms);
            });
        }

        Event::InstanceCancelled { id, at_ms } => {
            for member in state.subtree(id) {
                with_running(state, &member, |record| {
                    record.status = InstanceStatus::Cancelled;
                    record.pending = None;
                    record.finished_at_ms = Some(*at_ms);
                });
            }
        }

        Event::InstancePurged { id } => {
            let members = state.subtree(id);
            let all_terminal = members
                .iter()
                .all(|m| state.instances.get(m.as_str()).is_some_and(InstanceRecord::is_terminal));
            if !all_terminal {
                return;
            }
            for member in members {
                state.instances.remove(member.as_str());
            }
        }

        _ => {}
    }
}

/// Apply `f` to the instance only while it is still running.
fn with_running(state: &mut MaterializedState, id: &str, f: impl FnOnce(&mut InstanceRecord)) {
    if let Some(record) = state.instances.get_mut(id) {
        if !record.is_terminal() {
            f(record);
        }
    }
}
