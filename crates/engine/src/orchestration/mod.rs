// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic orchestration decisions.
//!
//! An orchestration is a pure function of its input and the recorded results
//! of its current generation. [`decide`] replays that history from the top
//! and returns the next [`Step`]. Logical time only moves when a recorded
//! result is consumed, so re-deciding the same history always yields the
//! same step.

mod await_exit;
mod supervise;

use vigil_core::{
    Fault, FaultKind, InstanceId, OrchestrationInput, Outcome, Task, TaskRecord, TaskResult,
};

/// What an instance should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Schedule the task at the next sequence number
    Schedule(Task),
    /// A task is in flight; nothing to do until its result is recorded
    Wait,
    /// Restart with a fresh history and this input
    ContinueAsNew(OrchestrationInput),
    Complete(Outcome),
    Fail(Fault),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Schedule(_) => "schedule",
            Step::Wait => "wait",
            Step::ContinueAsNew(_) => "continue_as_new",
            Step::Complete(_) => "complete",
            Step::Fail(_) => "fail",
        }
    }
}

/// Everything a decision may look at.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub instance_id: &'a InstanceId,
    pub input: &'a OrchestrationInput,
    pub generation: u32,
    pub generation_started_at_ms: u64,
    /// Recorded results of the current generation, ordered by `seq`
    pub history: &'a [TaskRecord],
    /// Sequence number of the task in flight, if any
    pub pending: Option<u32>,
    /// Set while recovering; suppresses first-execution logging
    pub is_replaying: bool,
}

impl DecisionContext<'_> {
    /// Completion time of the latest recorded result, or the generation start.
    pub fn logical_now_ms(&self) -> u64 {
        self.history.last().map_or(self.generation_started_at_ms, |r| r.completed_at_ms)
    }
}

/// Early exit from a decision while a task is outstanding.
pub(crate) struct Suspend(Step);

/// Cursor over the recorded history.
pub(crate) struct Replay<'a> {
    ctx: &'a DecisionContext<'a>,
    next_seq: u32,
    now_ms: u64,
}

impl<'a> Replay<'a> {
    fn new(ctx: &'a DecisionContext<'a>) -> Self {
        Self { ctx, next_seq: 0, now_ms: ctx.generation_started_at_ms }
    }

    pub fn instance_id(&self) -> &InstanceId {
        self.ctx.instance_id
    }

    /// Logical time: completion of the last consumed record.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// True while code is re-running over results it has seen before.
    pub fn is_replaying(&self) -> bool {
        self.ctx.is_replaying || (self.next_seq as usize) < self.ctx.history.len()
    }

    /// The recorded result of the next task, or a suspension that schedules
    /// `task` (or waits for it when already in flight).
    pub fn task(&mut self, task: Task) -> Result<&'a TaskRecord, Suspend> {
        let seq = self.next_seq;
        self.next_seq += 1;
        match self.ctx.history.get(seq as usize) {
            Some(record) if record.seq == seq => {
                self.now_ms = record.completed_at_ms;
                Ok(record)
            }
            Some(record) => Err(Suspend(Step::Fail(nondeterminism(seq, &format!(
                "history slot holds seq {}",
                record.seq
            ))))),
            None if self.ctx.pending == Some(seq) => Err(Suspend(Step::Wait)),
            None => Err(Suspend(Step::Schedule(task))),
        }
    }

    /// Terminal step for a recorded result of the wrong shape.
    pub fn unexpected(&self, record: &TaskRecord, expected: &str) -> Step {
        let found = match &record.result {
            TaskResult::Activity { .. } => "activity result",
            TaskResult::TimerFired => "timer",
            TaskResult::ChildFinished { .. } => "child result",
        };
        Step::Fail(nondeterminism(record.seq, &format!("expected {expected}, found {found}")))
    }
}

fn nondeterminism(seq: u32, detail: &str) -> Fault {
    Fault::new(FaultKind::Nondeterminism, format!("seq {seq}: {detail}"))
}

/// Decide the next step for an instance.
pub fn decide(ctx: &DecisionContext<'_>) -> Step {
    let mut replay = Replay::new(ctx);
    let result = match ctx.input {
        OrchestrationInput::Supervise(request) => supervise::run(&mut replay, request),
        OrchestrationInput::AwaitExit(state) => await_exit::run(&mut replay, state),
    };
    match result {
        Ok(step) | Err(Suspend(step)) => step,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
