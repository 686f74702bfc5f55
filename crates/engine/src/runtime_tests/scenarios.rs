// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end supervisions against the fake provider

use super::*;
use vigil_adapters::{FakeCall, FakeFailure};
use vigil_core::{ContainerPolicy, FaultKind, RetryPolicy, SupervisionTuning};

const MINUTE_MS: u64 = 60_000;

#[tokio::test(start_paused = true)]
async fn job_finishing_after_three_polls_succeeds() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(2, &success_logs()));
    let mut ctx = setup(jobs);

    ctx.start(request(1, 10)).await;
    let root = ctx.drive().await;

    assert_eq!(root.status, InstanceStatus::Completed);
    assert_eq!(root.outcome, Some(Outcome::Success));
    assert_eq!(ctx.jobs.start_count(), 1);
    assert_eq!(ctx.jobs.status_count(), 3);

    let child = ctx.record(CHILD);
    assert_eq!(child.status, InstanceStatus::Completed);
    assert_eq!(child.polls, 3);
    assert_eq!(child.generation, 2);
}

#[tokio::test(start_paused = true)]
async fn start_stops_before_starting() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(0, &success_logs()));
    let mut ctx = setup(jobs);

    ctx.start(request(1, 10)).await;
    ctx.drive().await;

    let calls = ctx.jobs.calls();
    assert_eq!(calls[0], FakeCall::Stop(target()));
    assert_eq!(calls[1], FakeCall::Start(target()));
}

#[tokio::test(start_paused = true)]
async fn job_that_never_terminates_times_out() {
    let jobs = FakeJobControl::new()
        .with_job(target(), FakeJob::new().statuses([StatusStep::state("Running")]));
    let mut ctx = setup(jobs);
    let started_at = ctx.clock.epoch_ms();

    ctx.start(request(1, 3)).await;
    let root = ctx.drive().await;

    assert_eq!(root.status, InstanceStatus::Failed);
    assert_eq!(root.outcome, Some(Outcome::TimedOut { elapsed_minutes: 3 }));
    let fault = root.fault.unwrap();
    assert_eq!(fault.kind, FaultKind::TimedOut);
    assert_eq!(fault.message, "Exceeded processing time 3 minutes.");
    assert_eq!(ctx.clock.epoch_ms() - started_at, 3 * MINUTE_MS);

    let child = ctx.record(CHILD);
    assert!(child.generation <= request(1, 3).policy.max_generations());
    assert_eq!(ctx.jobs.calls().iter().filter(|c| matches!(c, FakeCall::GetLogs(..))).count(), 0);
}

#[tokio::test(start_paused = true)]
async fn interval_longer_than_budget_polls_once_more_then_times_out() {
    let jobs = FakeJobControl::new()
        .with_job(target(), FakeJob::new().statuses([StatusStep::state("Running")]));
    let mut ctx = setup(jobs);

    ctx.start(request(10, 3)).await;
    let root = ctx.drive().await;

    assert_eq!(root.outcome, Some(Outcome::TimedOut { elapsed_minutes: 10 }));
    assert_eq!(ctx.jobs.status_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn named_container_policy_reads_that_containers_logs() {
    let sidecar = format!("{}-1", target().job_group_name);
    let jobs = FakeJobControl::new().with_job(
        target(),
        FakeJob::new()
            .statuses([StatusStep::Containers(vec!["Running".into(), "Terminated".into()])])
            .logs(success_logs()),
    );
    let mut ctx = setup(jobs);
    let tuning = SupervisionTuning {
        container_policy: ContainerPolicy::Named(sidecar.clone()),
        ..SupervisionTuning::default()
    };

    ctx.start(request(1, 10).with_tuning(tuning)).await;
    let root = ctx.drive().await;

    assert_eq!(root.outcome, Some(Outcome::Success));
    let logs: Vec<_> =
        ctx.jobs.calls().into_iter().filter(|c| matches!(c, FakeCall::GetLogs(..))).collect();
    assert_eq!(logs, vec![FakeCall::GetLogs(target(), Some(sidecar))]);
}

#[tokio::test(start_paused = true)]
async fn transient_status_errors_within_budget_are_absorbed() {
    let jobs = FakeJobControl::new().with_job(
        target(),
        FakeJob::new()
            .statuses([
                StatusStep::state("Running"),
                StatusStep::Fail(FakeFailure::Transient),
                StatusStep::Fail(FakeFailure::Transient),
                StatusStep::terminated(),
            ])
            .logs(success_logs()),
    );
    let mut ctx = setup(jobs);
    let tuning = SupervisionTuning {
        status_retry: RetryPolicy::new(Duration::from_secs(30), 3, Duration::from_secs(90)),
        ..SupervisionTuning::default()
    };

    ctx.start(request(1, 10).with_tuning(tuning)).await;
    let root = ctx.drive().await;

    assert_eq!(root.outcome, Some(Outcome::Success));
    assert!(root.fault.is_none());
    assert_eq!(ctx.jobs.status_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn persistent_status_errors_exhaust_retries() {
    let jobs = FakeJobControl::new().with_job(
        target(),
        FakeJob::new().statuses([
            StatusStep::state("Running"),
            StatusStep::Fail(FakeFailure::Transient),
        ]),
    );
    let mut ctx = setup(jobs);

    ctx.start(request(1, 10)).await;
    let root = ctx.drive().await;

    assert_eq!(root.status, InstanceStatus::Failed);
    assert_eq!(root.fault.unwrap().kind, FaultKind::RetriesExhausted);
    assert_eq!(ctx.record(CHILD).status, InstanceStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn missing_job_fails_at_start() {
    let mut ctx = setup(FakeJobControl::new());

    ctx.start(request(1, 10)).await;
    let root = ctx.drive().await;

    assert_eq!(root.status, InstanceStatus::Failed);
    assert_eq!(root.fault.unwrap().kind, FaultKind::TargetNotFound);
    assert!(ctx.runtime.instance(CHILD).is_none());
}

#[tokio::test(start_paused = true)]
async fn job_without_success_marker_fails_with_logs() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(1, "segfault"));
    let mut ctx = setup(jobs);

    ctx.start(request(1, 10)).await;
    let root = ctx.drive().await;

    let fault = root.fault.unwrap();
    assert_eq!(fault.kind, FaultKind::JobFailed);
    assert_eq!(fault.message, "logs: segfault");
    assert_eq!(root.outcome, Some(Outcome::Failure { reason: "logs: segfault".into() }));
}

#[tokio::test(start_paused = true)]
async fn job_invisible_within_grace_is_polled_again() {
    let jobs = FakeJobControl::new().with_job(
        target(),
        FakeJob::new()
            .statuses([StatusStep::Missing, StatusStep::Missing, StatusStep::terminated()])
            .logs(success_logs()),
    );
    let mut ctx = setup(jobs);

    ctx.start(request(1, 10)).await;
    let root = ctx.drive().await;

    assert_eq!(root.outcome, Some(Outcome::Success));
    assert_eq!(ctx.jobs.status_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn job_invisible_past_grace_is_not_found() {
    let jobs = FakeJobControl::new()
        .with_job(target(), FakeJob::new().statuses([StatusStep::Missing]));
    let mut ctx = setup(jobs);
    let tuning =
        SupervisionTuning { not_found_grace: Duration::from_secs(120), ..Default::default() };

    ctx.start(request(1, 10).with_tuning(tuning)).await;
    let root = ctx.drive().await;

    let fault = root.fault.unwrap();
    assert_eq!(fault.kind, FaultKind::TargetNotFound);
    assert_eq!(fault.message, "job rg-test/job-test not found");
    // polls at 0, 1 and 2 minutes; the third is past the grace window
    assert_eq!(ctx.jobs.status_count(), 3);
}
