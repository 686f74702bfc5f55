// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outer orchestration: start the job once, then hand polling to a child.

use super::{Replay, Step, Suspend};
use vigil_core::{
    Activity, ActivityOutput, OrchestrationInput, PollCycleState, SupervisionRequest, Task,
    TaskResult,
};

pub(super) fn run(replay: &mut Replay<'_>, request: &SupervisionRequest) -> Result<Step, Suspend> {
    if !replay.is_replaying() {
        tracing::info!(
            instance = %replay.instance_id(),
            target = %request.target,
            interval_minutes = request.policy.polling_interval_minutes,
            max_minutes = request.policy.max_processing_time_minutes,
            "supervising job"
        );
    }

    let started = replay.task(Task::activity(Activity::StartJob))?;
    match &started.result {
        TaskResult::Activity { output: Ok(ActivityOutput::Started) } => {}
        TaskResult::Activity { output: Err(e) } => return Ok(Step::Fail(e.clone().into_fault())),
        _ => return Ok(replay.unexpected(started, "start_job result")),
    }

    // Measured from the recorded start, so every replay derives the same deadline
    let max_ms = request.policy.max_processing_time().as_millis() as u64;
    let deadline_ms = replay.now_ms() + max_ms;
    let child = Task::SubOrchestration {
        child_id: replay.instance_id().child(1),
        input: OrchestrationInput::AwaitExit(PollCycleState {
            deadline_ms,
            request: request.clone(),
        }),
    };

    let finished = replay.task(child)?;
    match &finished.result {
        TaskResult::ChildFinished { result: Ok(outcome) } => Ok(Step::Complete(outcome.clone())),
        TaskResult::ChildFinished { result: Err(fault) } => Ok(Step::Fail(fault.clone())),
        _ => Ok(replay.unexpected(finished, "child result")),
    }
}
