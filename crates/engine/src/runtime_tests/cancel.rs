// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vigil_core::InstanceId;

fn cancelled(id: &str, at_ms: u64) -> Event {
    Event::InstanceCancelled { id: InstanceId::from_string(id), at_ms }
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_tree_and_disarms_timers() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(5, &success_logs()));
    let mut ctx = setup(jobs);
    ctx.start(request(1, 10)).await;
    ctx.drive_to_first_sleep().await;
    assert!(ctx.runtime.scheduler().lock().has_timers());

    ctx.process(vec![cancelled(ROOT, ctx.clock.epoch_ms())]).await;

    for id in [ROOT, CHILD] {
        let record = ctx.record(id);
        assert_eq!(record.status, InstanceStatus::Cancelled, "{id}");
        assert!(record.pending.is_none());
    }
    assert!(!ctx.runtime.scheduler().lock().has_timers());
}

#[tokio::test(start_paused = true)]
async fn activity_result_after_cancel_is_ignored() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(5, &success_logs()));
    let mut ctx = setup(jobs);
    ctx.start(request(1, 10)).await;

    // StartJob is in flight when the cancel lands
    ctx.process(vec![cancelled(ROOT, ctx.clock.epoch_ms())]).await;
    ctx.complete_activity().await;

    let root = ctx.record(ROOT);
    assert_eq!(root.status, InstanceStatus::Cancelled);
    assert!(root.history.is_empty());
    assert!(ctx.runtime.instance(CHILD).is_none());
}

#[tokio::test(start_paused = true)]
async fn stale_timer_after_cancel_emits_nothing() {
    let jobs = FakeJobControl::new().with_job(target(), job_running_for(5, &success_logs()));
    let mut ctx = setup(jobs);
    ctx.start(request(1, 10)).await;
    ctx.drive_to_first_sleep().await;
    let timer = ctx.runtime.scheduler().lock().timers_for(&InstanceId::from_string(CHILD));

    ctx.process(vec![cancelled(ROOT, ctx.clock.epoch_ms())]).await;

    let events = ctx.runtime.handle_event(Event::TimerFired { id: timer[0].clone() }).await.unwrap();
    assert!(events.is_empty());
}
