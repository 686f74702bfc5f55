// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling loop: one status check per generation.
//!
//! ```text
//! status ──terminal──▶ logs ──▶ Complete(Success) | Fail(JobFailed)
//!    │
//!    ├─ now < deadline ──▶ sleep(interval) ──▶ ContinueAsNew(same state)
//!    └─ otherwise ───────▶ Fail(TimedOut)
//! ```

use super::{Replay, Step, Suspend};
use vigil_core::{
    classify, elapsed_minutes, Activity, ActivityOutput, Fault, FaultKind, OrchestrationInput,
    Outcome, PollCycleState, Task, TaskResult,
};

pub(super) fn run(replay: &mut Replay<'_>, state: &PollCycleState) -> Result<Step, Suspend> {
    let request = &state.request;
    let tuning = &request.tuning;

    let status =
        replay.task(Task::activity_with_retry(Activity::GetStatus, tuning.status_retry))?;
    let snapshot = match &status.result {
        TaskResult::Activity { output: Ok(ActivityOutput::Status(snapshot)) } => snapshot.as_ref(),
        TaskResult::Activity { output: Err(e) } => {
            if !replay.is_replaying() {
                tracing::error!(instance = %replay.instance_id(), error = %e, "status check failed");
            }
            return Ok(Step::Fail(e.clone().into_fault()));
        }
        _ => return Ok(replay.unexpected(status, "get_status result")),
    };

    let now_ms = replay.now_ms();
    let terminal = match snapshot {
        Some(snapshot) => snapshot.is_terminal(&tuning.container_policy),
        None => {
            let grace_ends_ms =
                state.loop_started_ms() + tuning.not_found_grace.as_millis() as u64;
            if now_ms >= grace_ends_ms {
                return Ok(Step::Fail(Fault::new(
                    FaultKind::TargetNotFound,
                    format!("job {} not found", request.target),
                )));
            }
            false
        }
    };

    if terminal {
        let logs = replay.task(Task::activity(Activity::GetLogs))?;
        let text = match &logs.result {
            TaskResult::Activity { output: Ok(ActivityOutput::Logs(text)) } => text,
            TaskResult::Activity { output: Err(e) } => {
                return Ok(Step::Fail(e.clone().into_fault()))
            }
            _ => return Ok(replay.unexpected(logs, "get_logs result")),
        };
        return Ok(match classify(Some(text)) {
            Outcome::Success => Step::Complete(Outcome::Success),
            _ => {
                if !replay.is_replaying() {
                    tracing::error!(instance = %replay.instance_id(), "logs: {}", text);
                }
                Step::Fail(Fault::job_failed(text))
            }
        });
    }

    if now_ms < state.deadline_ms {
        let interval_ms = request.policy.polling_interval().as_millis() as u64;
        let slept = replay.task(Task::Timer { fire_at_ms: now_ms + interval_ms })?;
        return Ok(match slept.result {
            TaskResult::TimerFired => {
                Step::ContinueAsNew(OrchestrationInput::AwaitExit(state.clone()))
            }
            _ => replay.unexpected(slept, "timer"),
        });
    }

    let max_minutes = request.policy.max_processing_time_minutes;
    if !replay.is_replaying() {
        tracing::warn!(
            instance = %replay.instance_id(),
            "Exceeded processing time {} minutes.",
            max_minutes
        );
    }
    Ok(Step::Fail(Fault::timed_out(max_minutes, elapsed_minutes(state.loop_started_ms(), now_ms))))
}
