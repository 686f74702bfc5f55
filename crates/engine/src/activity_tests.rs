// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vigil_adapters::{FakeCall, FakeFailure, FakeJob, FakeJobControl, StatusStep};
use vigil_core::ActivityErrorKind;

const SETTLE: Duration = Duration::from_secs(5);

fn target() -> JobTarget {
    JobTarget::new("rg", "job")
}

fn fake(statuses: impl IntoIterator<Item = StatusStep>) -> FakeJobControl {
    FakeJobControl::new().with_job(target(), FakeJob::new().statuses(statuses).logs("ok"))
}

fn transient() -> StatusStep {
    StatusStep::Fail(FakeFailure::Transient)
}

fn loose_policy() -> RetryPolicy {
    RetryPolicy::new(Duration::from_secs(30), 3, Duration::from_secs(120))
}

#[tokio::test(start_paused = true)]
async fn start_stops_settles_then_starts() {
    let jobs = fake([]);
    let before = Instant::now();

    let output = run(&jobs, Activity::StartJob, &target(), None, None, SETTLE).await.unwrap();

    assert_eq!(output, ActivityOutput::Started);
    assert!(before.elapsed() >= SETTLE);
    assert_eq!(jobs.calls(), vec![FakeCall::Stop(target()), FakeCall::Start(target())]);
}

#[tokio::test(start_paused = true)]
async fn start_on_missing_job_is_not_retried() {
    let jobs = FakeJobControl::new();
    let err = run(&jobs, Activity::StartJob, &target(), None, Some(loose_policy()), SETTLE)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ActivityErrorKind::TargetNotFound);
    assert_eq!(jobs.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_within_budget_recover() {
    let jobs = fake([transient(), transient(), StatusStep::state("Running")]);

    let output =
        run(&jobs, Activity::GetStatus, &target(), None, Some(loose_policy()), SETTLE).await.unwrap();

    assert!(matches!(output, ActivityOutput::Status(Some(_))));
    assert_eq!(jobs.status_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn attempts_are_capped_by_max_attempts() {
    let jobs = fake([transient()]);

    let err = run(&jobs, Activity::GetStatus, &target(), None, Some(loose_policy()), SETTLE)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ActivityErrorKind::RetriesExhausted);
    assert!(err.message.ends_with("(after 3 attempts)"), "{}", err.message);
    assert_eq!(jobs.status_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn default_status_policy_stops_at_retry_timeout() {
    // 30s interval with a 30s overall budget leaves room for one retry
    let jobs = fake([transient()]);

    let err = run(&jobs, Activity::GetStatus, &target(), None, Some(RetryPolicy::status_check()), SETTLE)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ActivityErrorKind::RetriesExhausted);
    assert_eq!(jobs.status_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn no_policy_returns_first_error() {
    let jobs = fake([transient()]);
    let err = run(&jobs, Activity::GetStatus, &target(), None, None, SETTLE).await.unwrap_err();
    assert_eq!(err.kind, ActivityErrorKind::Transient);
    assert_eq!(jobs.status_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_status_is_not_an_error() {
    let jobs = fake([StatusStep::Missing]);
    let output = run(&jobs, Activity::GetStatus, &target(), None, None, SETTLE).await.unwrap();
    assert_eq!(output, ActivityOutput::Status(None));
}

#[tokio::test(start_paused = true)]
async fn logs_pass_through() {
    let jobs = fake([]);
    let output = run(&jobs, Activity::GetLogs, &target(), None, None, SETTLE).await.unwrap();
    assert_eq!(output, ActivityOutput::Logs("ok".to_string()));
}

#[tokio::test(start_paused = true)]
async fn logs_read_the_requested_container() {
    let jobs = fake([]);
    run(&jobs, Activity::GetLogs, &target(), Some("worker"), None, SETTLE).await.unwrap();
    assert_eq!(jobs.calls(), vec![FakeCall::GetLogs(target(), Some("worker".to_string()))]);
}
