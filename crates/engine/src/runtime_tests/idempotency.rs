// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events are handled again after a restart; handling must not duplicate work.

use super::*;
use vigil_core::{InstanceId, TimerId};

#[tokio::test(start_paused = true)]
async fn duplicate_create_schedules_start_once() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(0, &success_logs()));
    let mut ctx = setup(jobs);
    let created = ctx.created_event(request(1, 10));

    ctx.process(vec![created.clone()]).await;
    let again = ctx.runtime.handle_event(created).await.unwrap();
    assert!(again.is_empty(), "second create should be a no-op");

    ctx.drive().await;
    assert_eq!(ctx.jobs.start_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn duplicate_task_result_is_absorbed() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(3, &success_logs()));
    let mut ctx = setup(jobs);
    ctx.start(request(1, 10)).await;

    let started = ctx.event_rx.recv().await.unwrap();
    ctx.process(vec![started.clone()]).await;
    let root_before = ctx.record(ROOT);

    ctx.process(vec![started]).await;

    assert_eq!(ctx.record(ROOT), root_before);
    assert_eq!(ctx.runtime.state().lock().instances.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unrecognized_timer_is_ignored() {
    let ctx = setup(FakeJobControl::new());
    let events = ctx
        .runtime
        .handle_event(Event::TimerFired { id: TimerId::from_string("tmr-unrelated") })
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test(start_paused = true)]
async fn timer_for_finished_task_is_ignored() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(5, &success_logs()));
    let mut ctx = setup(jobs);
    ctx.start(request(1, 10)).await;
    ctx.drive_to_first_sleep().await;
    let timer = ctx.runtime.scheduler().lock().timers_for(&InstanceId::from_string(CHILD));

    ctx.fire_next_timer().await;
    let generation = ctx.record(CHILD).generation;
    let events = ctx.runtime.handle_event(Event::TimerFired { id: timer[0].clone() }).await.unwrap();

    assert!(events.is_empty());
    assert_eq!(ctx.record(CHILD).generation, generation);
}

#[tokio::test(start_paused = true)]
async fn result_from_previous_generation_is_ignored() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(5, &success_logs()));
    let mut ctx = setup(jobs);
    ctx.start(request(1, 10)).await;
    ctx.drive_to_first_sleep().await;
    ctx.fire_next_timer().await;
    assert_eq!(ctx.record(CHILD).generation, 1);

    let stale = vigil_core::test_support::task_completed_event(
        CHILD,
        0,
        0,
        ctx.clock.epoch_ms(),
        vigil_core::TaskResult::TimerFired,
    );
    let events = ctx.runtime.handle_event(stale).await.unwrap();
    assert!(events.is_empty());
}
