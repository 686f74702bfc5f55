// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use vigil_core::test_support::{logs_result, request, snapshot, status_result, strategies};
use vigil_core::{
    Activity, ActivityError, ActivityErrorKind, ActivityOutput, ContainerPolicy, ContainerStatus,
    PollCycleState, SupervisionRequest, SupervisionTuning,
};

const MINUTE: u64 = 60_000;
const T0: u64 = 1_000_000;

fn root() -> InstanceId {
    InstanceId::from_string("sup-root")
}

fn child() -> InstanceId {
    InstanceId::from_string("sup-root-1")
}

fn record(seq: u32, completed_at_ms: u64, result: TaskResult) -> TaskRecord {
    TaskRecord { seq, completed_at_ms, result }
}

fn started() -> TaskResult {
    TaskResult::Activity { output: Ok(ActivityOutput::Started) }
}

fn missing() -> TaskResult {
    TaskResult::Activity { output: Ok(ActivityOutput::Status(None)) }
}

fn activity_err(kind: ActivityErrorKind, message: &str) -> TaskResult {
    TaskResult::Activity { output: Err(ActivityError::new(kind, message)) }
}

fn poll_state(interval: u32, max: u32) -> PollCycleState {
    PollCycleState { deadline_ms: T0 + u64::from(max) * MINUTE, request: request(interval, max) }
}

/// Decide over a fixed history with nothing in flight.
fn decide_at(
    id: &InstanceId,
    input: &OrchestrationInput,
    started_at_ms: u64,
    history: &[TaskRecord],
) -> Step {
    decide(&DecisionContext {
        instance_id: id,
        input,
        generation: 0,
        generation_started_at_ms: started_at_ms,
        history,
        pending: None,
        is_replaying: false,
    })
}

// ── supervise ───────────────────────────────────────────────────────────

#[test]
fn supervise_starts_job_first() {
    let input = OrchestrationInput::Supervise(request(1, 10));
    assert_eq!(
        decide_at(&root(), &input, T0, &[]),
        Step::Schedule(Task::activity(Activity::StartJob))
    );
}

#[test]
fn supervise_waits_while_start_in_flight() {
    let input = OrchestrationInput::Supervise(request(1, 10));
    let ctx = DecisionContext {
        instance_id: &root(),
        input: &input,
        generation: 0,
        generation_started_at_ms: T0,
        history: &[],
        pending: Some(0),
        is_replaying: false,
    };
    assert_eq!(decide(&ctx), Step::Wait);
}

#[test]
fn supervise_derives_deadline_from_recorded_start() {
    let req = request(1, 10);
    let input = OrchestrationInput::Supervise(req.clone());
    let history = [record(0, T0 + 7_000, started())];

    let step = decide_at(&root(), &input, T0, &history);

    assert_eq!(
        step,
        Step::Schedule(Task::SubOrchestration {
            child_id: child(),
            input: OrchestrationInput::AwaitExit(PollCycleState {
                deadline_ms: T0 + 7_000 + 10 * MINUTE,
                request: req,
            }),
        })
    );
}

#[test]
fn supervise_fails_when_target_missing_at_start() {
    let input = OrchestrationInput::Supervise(request(1, 10));
    let history = [record(0, T0, activity_err(ActivityErrorKind::TargetNotFound, "rg/job"))];

    let Step::Fail(fault) = decide_at(&root(), &input, T0, &history) else {
        panic!("expected failure");
    };
    assert_eq!(fault.kind, FaultKind::TargetNotFound);
}

#[yare::parameterized(
    success  = { Ok(Outcome::Success), Step::Complete(Outcome::Success) },
    failure  = {
        Err(Fault::job_failed("boom")),
        Step::Fail(Fault::job_failed("boom"))
    },
    timeout  = {
        Err(Fault::timed_out(10, 10)),
        Step::Fail(Fault::timed_out(10, 10))
    },
)]
fn supervise_propagates_child_result(result: Result<Outcome, Fault>, expected: Step) {
    let input = OrchestrationInput::Supervise(request(1, 10));
    let history = [
        record(0, T0, started()),
        record(1, T0 + 5 * MINUTE, TaskResult::ChildFinished { result }),
    ];
    assert_eq!(decide_at(&root(), &input, T0, &history), expected);
}

#[test]
fn mismatched_history_is_nondeterminism() {
    let input = OrchestrationInput::Supervise(request(1, 10));
    let history = [record(0, T0, TaskResult::TimerFired)];

    let Step::Fail(fault) = decide_at(&root(), &input, T0, &history) else {
        panic!("expected failure");
    };
    assert_eq!(fault.kind, FaultKind::Nondeterminism);
}

// ── await_exit ──────────────────────────────────────────────────────────

#[test]
fn await_exit_checks_status_with_retry() {
    let input = OrchestrationInput::AwaitExit(poll_state(1, 10));
    assert_eq!(
        decide_at(&child(), &input, T0, &[]),
        Step::Schedule(Task::activity_with_retry(
            Activity::GetStatus,
            SupervisionTuning::default().status_retry
        ))
    );
}

#[test]
fn running_job_sleeps_for_interval() {
    let input = OrchestrationInput::AwaitExit(poll_state(2, 10));
    let history = [record(0, T0 + 1_000, status_result("Running"))];
    assert_eq!(
        decide_at(&child(), &input, T0, &history),
        Step::Schedule(Task::Timer { fire_at_ms: T0 + 1_000 + 2 * MINUTE })
    );
}

#[test]
fn fired_timer_continues_with_same_state() {
    let state = poll_state(2, 10);
    let input = OrchestrationInput::AwaitExit(state.clone());
    let history = [
        record(0, T0, status_result("Running")),
        record(1, T0 + 2 * MINUTE, TaskResult::TimerFired),
    ];
    assert_eq!(
        decide_at(&child(), &input, T0, &history),
        Step::ContinueAsNew(OrchestrationInput::AwaitExit(state))
    );
}

#[test]
fn terminated_job_fetches_logs() {
    let input = OrchestrationInput::AwaitExit(poll_state(1, 10));
    let history = [record(0, T0, status_result("Terminated"))];
    assert_eq!(
        decide_at(&child(), &input, T0, &history),
        Step::Schedule(Task::activity(Activity::GetLogs))
    );
}

#[yare::parameterized(
    marker       = { "done. exit_code_success", Step::Complete(Outcome::Success) },
    failure_code = { "EXIT_CODE_FAILURE", Step::Fail(Fault::job_failed("EXIT_CODE_FAILURE")) },
    empty        = { "", Step::Fail(Fault::job_failed("")) },
)]
fn logs_decide_outcome(logs: &str, expected: Step) {
    let input = OrchestrationInput::AwaitExit(poll_state(1, 10));
    let history = [record(0, T0, status_result("Terminated")), record(1, T0, logs_result(logs))];
    assert_eq!(decide_at(&child(), &input, T0, &history), expected);
}

#[test]
fn exhausted_status_retries_fault() {
    let input = OrchestrationInput::AwaitExit(poll_state(1, 10));
    let history =
        [record(0, T0, activity_err(ActivityErrorKind::RetriesExhausted, "503 (after 3 attempts)"))];
    let Step::Fail(fault) = decide_at(&child(), &input, T0, &history) else {
        panic!("expected failure");
    };
    assert_eq!(fault.kind, FaultKind::RetriesExhausted);
}

#[yare::parameterized(
    just_before = { 10 * MINUTE - 1, false },
    exactly_at  = { 10 * MINUTE, true },
    after       = { 10 * MINUTE + 1, true },
)]
fn timeout_boundary(offset_ms: u64, times_out: bool) {
    let input = OrchestrationInput::AwaitExit(poll_state(1, 10));
    let history = [record(0, T0 + offset_ms, status_result("Running"))];

    let step = decide_at(&child(), &input, T0 + offset_ms, &history);

    match step {
        Step::Fail(fault) if times_out => {
            assert_eq!(fault.kind, FaultKind::TimedOut);
            assert_eq!(fault.outcome(), Outcome::TimedOut { elapsed_minutes: offset_ms / MINUTE });
            assert_eq!(fault.message, "Exceeded processing time 10 minutes.");
        }
        Step::Schedule(Task::Timer { .. }) if !times_out => {}
        other => panic!("unexpected step {other:?}"),
    }
}

#[test]
fn missing_job_within_grace_keeps_polling() {
    let input = OrchestrationInput::AwaitExit(poll_state(1, 60));
    let history = [record(0, T0 + 4 * MINUTE, missing())];
    assert!(matches!(
        decide_at(&child(), &input, T0 + 4 * MINUTE, &history),
        Step::Schedule(Task::Timer { .. })
    ));
}

#[test]
fn missing_job_after_grace_faults() {
    let input = OrchestrationInput::AwaitExit(poll_state(1, 60));
    let history = [record(0, T0 + 5 * MINUTE, missing())];
    let Step::Fail(fault) = decide_at(&child(), &input, T0 + 5 * MINUTE, &history) else {
        panic!("expected failure");
    };
    assert_eq!(fault.kind, FaultKind::TargetNotFound);
    assert!(fault.message.contains("rg-test/job-test"));
}

#[yare::parameterized(
    first_default   = { ContainerPolicy::FirstContainer, false },
    any_terminated  = { ContainerPolicy::AnyTerminated, true },
    all_terminated  = { ContainerPolicy::AllTerminated, false },
    named_sidecar   = { ContainerPolicy::Named("sidecar".to_string()), true },
)]
fn container_policy_decides_terminal(policy: ContainerPolicy, terminal: bool) {
    let tuning = SupervisionTuning { container_policy: policy, ..SupervisionTuning::default() };
    let req: SupervisionRequest = request(1, 10).with_tuning(tuning);
    let mut snap = snapshot("Running");
    snap.containers.push(ContainerStatus {
        name: "sidecar".to_string(),
        current_state_label: Some("Terminated".to_string()),
        restart_count: None,
    });
    let input = OrchestrationInput::AwaitExit(PollCycleState { deadline_ms: T0 + 10 * MINUTE, request: req });
    let history = [record(
        0,
        T0,
        TaskResult::Activity { output: Ok(ActivityOutput::Status(Some(snap))) },
    )];

    let step = decide_at(&child(), &input, T0, &history);
    assert_eq!(step == Step::Schedule(Task::activity(Activity::GetLogs)), terminal, "{step:?}");
}

// ── properties ──────────────────────────────────────────────────────────

/// Drive the polling loop against a job that never finishes, with status
/// checks completing instantly and timers firing on time.
fn generations_until_done(state: &PollCycleState) -> (u32, Step) {
    let input = OrchestrationInput::AwaitExit(state.clone());
    let mut generation_start = state.loop_started_ms();
    for generation in 1..=10_000u32 {
        let mut history = vec![record(0, generation_start, status_result("Running"))];
        let step = decide_at(&child(), &input, generation_start, &history);
        let Step::Schedule(Task::Timer { fire_at_ms }) = step else {
            return (generation, step);
        };
        history.push(record(1, fire_at_ms, TaskResult::TimerFired));
        let next = decide_at(&child(), &input, generation_start, &history);
        assert!(matches!(next, Step::ContinueAsNew(_)), "{next:?}");
        generation_start = fire_at_ms;
    }
    panic!("polling loop did not terminate");
}

proptest! {
    #[test]
    fn polling_terminates_within_bound(policy in strategies::arb_bounded_policy()) {
        let req = SupervisionRequest::new(vigil_core::JobTarget::new("rg", "job"), policy);
        let state = PollCycleState {
            deadline_ms: T0 + policy.max_processing_time().as_millis() as u64,
            request: req,
        };

        let (generations, last) = generations_until_done(&state);

        prop_assert!(generations <= policy.max_generations());
        prop_assert!(matches!(last, Step::Fail(ref f) if f.kind == FaultKind::TimedOut));
    }

    #[test]
    fn redeciding_same_history_is_stable(
        policy in strategies::arb_bounded_policy(),
        start_offset in 0u64..1_000_000,
    ) {
        let req = SupervisionRequest::new(vigil_core::JobTarget::new("rg", "job"), policy);
        let input = OrchestrationInput::Supervise(req);
        let history = [record(0, T0 + start_offset, started())];

        let first = decide_at(&root(), &input, T0, &history);
        let ctx = DecisionContext {
            instance_id: &root(),
            input: &input,
            generation: 0,
            generation_started_at_ms: T0,
            history: &history,
            pending: None,
            is_replaying: true,
        };
        let replayed = decide(&ctx);

        prop_assert_eq!(&first, &replayed);
        let Step::Schedule(Task::SubOrchestration { input: OrchestrationInput::AwaitExit(state), .. }) = first else {
            return Err(TestCaseError::fail("expected child"));
        };
        prop_assert_eq!(state.deadline_ms, T0 + start_offset + policy.max_processing_time().as_millis() as u64);
    }
}

#[test]
fn logical_now_tracks_last_record() {
    let input = OrchestrationInput::Supervise(request(1, 10));
    let history = [record(0, T0 + 42, started())];
    let ctx = DecisionContext {
        instance_id: &root(),
        input: &input,
        generation: 3,
        generation_started_at_ms: T0,
        history: &history,
        pending: None,
        is_replaying: false,
    };
    assert_eq!(ctx.logical_now_ms(), T0 + 42);
    assert_eq!(DecisionContext { history: &[], ..ctx }.logical_now_ms(), T0);
}

#[test]
fn step_names() {
    assert_eq!(Step::Wait.name(), "wait");
    assert_eq!(Step::Complete(Outcome::Success).name(), "complete");
}
