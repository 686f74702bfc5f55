// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resuming in-flight work against state recovered from disk

use super::*;
use vigil_core::{Activity, InstanceId, TimerId};

/// Simulate a restart: a fresh runtime over a copy of the current state.
fn restart(ctx: &TestContext) -> TestContext {
    let state = ctx.runtime.state().lock().clone();
    let restarted = setup_with_state(ctx.jobs.clone(), state);
    restarted.clock.set_epoch_ms(ctx.clock.epoch_ms());
    restarted
}

#[tokio::test(start_paused = true)]
async fn sleeping_child_gets_its_timer_back() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(2, &success_logs()));
    let mut before = setup(jobs);
    before.start(request(1, 10)).await;
    before.drive_to_first_sleep().await;

    let mut ctx = restart(&before);
    assert!(!ctx.runtime.scheduler().lock().has_timers());

    let events = ctx.runtime.resume_pending().await.unwrap();
    assert!(events.is_empty(), "re-arming a timer writes nothing");
    let timers = ctx.runtime.scheduler().lock().timers_for(&InstanceId::from_string(CHILD));
    assert_eq!(timers, vec![TimerId::task(&InstanceId::from_string(CHILD), 0, 1)]);

    let root = ctx.drive().await;
    assert_eq!(root.outcome, Some(Outcome::Success));
    assert_eq!(ctx.jobs.start_count(), 1, "restart must not start the job again");
}

#[tokio::test(start_paused = true)]
async fn pending_activity_is_dispatched_again() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(0, &success_logs()));
    let seed = setup(jobs.clone());
    let mut state = MaterializedState::default();
    state.apply_event(&seed.created_event(request(1, 10)));
    state.apply_event(&Event::TaskScheduled {
        id: InstanceId::from_string(ROOT),
        generation: 0,
        seq: 0,
        task: Task::activity(Activity::StartJob),
    });

    let mut ctx = setup_with_state(jobs, state);
    ctx.runtime.resume_pending().await.unwrap();
    let root = ctx.drive().await;

    assert_eq!(root.outcome, Some(Outcome::Success));
    assert_eq!(ctx.jobs.start_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn instance_with_nothing_pending_is_redecided() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(0, &success_logs()));
    let seed = setup(jobs.clone());
    let mut state = MaterializedState::default();
    state.apply_event(&seed.created_event(request(1, 10)));

    let mut ctx = setup_with_state(jobs, state);
    let events = ctx.runtime.resume_pending().await.unwrap();
    assert!(matches!(events.first(), Some(Event::TaskScheduled { .. })));

    let root = ctx.drive().await;
    assert_eq!(root.outcome, Some(Outcome::Success));
}

#[tokio::test(start_paused = true)]
async fn finished_child_result_reaches_waiting_parent() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(0, &success_logs()));
    let mut before = setup(jobs);
    before.start(request(1, 10)).await;
    // start result, then the single status poll and the log fetch
    before.complete_activity().await;
    before.complete_activity().await;

    // Crash after the child's logs arrive but before the parent hears back:
    // finish the child in state only.
    let logs = before.event_rx.recv().await.unwrap();
    before.runtime.state().lock().apply_event(&logs);
    let child = before.record(CHILD);
    before.runtime.state().lock().apply_event(&Event::InstanceCompleted {
        id: child.id.clone(),
        outcome: Outcome::Success,
        at_ms: before.clock.epoch_ms(),
    });

    let ctx = restart(&before);
    let events = ctx.runtime.resume_pending().await.unwrap();
    ctx.process(events).await;

    let root = ctx.record(ROOT);
    assert_eq!(root.status, InstanceStatus::Completed);
    assert_eq!(root.outcome, Some(Outcome::Success));
}

#[tokio::test(start_paused = true)]
async fn terminal_instances_are_left_alone() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(0, &success_logs()));
    let mut before = setup(jobs);
    before.start(request(1, 10)).await;
    before.drive().await;
    let calls = before.jobs.calls().len();

    let ctx = restart(&before);
    let events = ctx.runtime.resume_pending().await.unwrap();

    assert!(events.is_empty());
    assert_eq!(ctx.jobs.calls().len(), calls);
}
