// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod cancel;
mod idempotency;
mod recovery;
mod scenarios;

use super::*;
use std::collections::VecDeque;
use std::time::Duration;
use vigil_adapters::{FakeJob, FakeJobControl, StatusStep};
use vigil_core::test_support::{request, supervise_created_event};
use vigil_core::{
    FakeClock, InstanceStatus, JobTarget, Outcome, SupervisionRequest, Task, SUCCESS_MARKER,
};
use vigil_storage::PendingTask;

pub(super) const ROOT: &str = "sup-root";
pub(super) const CHILD: &str = "sup-root-1";

type TestRuntime = Runtime<FakeJobControl, FakeClock>;

pub(super) struct TestContext {
    pub runtime: TestRuntime,
    pub jobs: FakeJobControl,
    pub clock: FakeClock,
    pub event_rx: mpsc::Receiver<Event>,
}

pub(super) fn target() -> JobTarget {
    JobTarget::new("rg-test", "job-test")
}

pub(super) fn success_logs() -> String {
    format!("processing done\n{SUCCESS_MARKER}\n")
}

/// A job that runs for `running_polls` status checks, then terminates with `logs`.
pub(super) fn job_running_for(running_polls: usize, logs: &str) -> FakeJob {
    let mut steps = vec![StatusStep::state("Running"); running_polls];
    steps.push(StatusStep::terminated());
    FakeJob::new().statuses(steps).logs(logs)
}

pub(super) fn setup(jobs: FakeJobControl) -> TestContext {
    setup_with_state(jobs, MaterializedState::default())
}

pub(super) fn setup_with_state(jobs: FakeJobControl, state: MaterializedState) -> TestContext {
    let (event_tx, event_rx) = mpsc::channel(100);
    let clock = FakeClock::new();
    let runtime = Runtime::new(
        RuntimeDeps { jobs: jobs.clone(), state: Arc::new(Mutex::new(state)) },
        clock.clone(),
        event_tx,
    );
    TestContext { runtime, jobs, clock, event_rx }
}

impl TestContext {
    pub fn created_event(&self, request: SupervisionRequest) -> Event {
        supervise_created_event(ROOT, request, self.clock.epoch_ms())
    }

    /// Feed events through state and runtime until no more are produced,
    /// the way the engine loop does with events read back from the WAL.
    pub async fn process(&self, events: Vec<Event>) {
        let mut queue: VecDeque<Event> = events.into();
        while let Some(event) = queue.pop_front() {
            self.runtime.state().lock().apply_event(&event);
            queue.extend(self.runtime.handle_event(event).await.unwrap());
        }
    }

    pub async fn start(&self, request: SupervisionRequest) {
        self.process(vec![self.created_event(request)]).await;
    }

    pub fn record(&self, id: &str) -> vigil_storage::InstanceRecord {
        self.runtime.instance(id).unwrap()
    }

    pub fn activity_in_flight(&self) -> bool {
        self.runtime.state().lock().instances.values().any(|r| {
            !r.is_terminal() && matches!(r.pending, Some(PendingTask { task: Task::Activity { .. }, .. }))
        })
    }

    /// Wait for the next activity result and process it.
    pub async fn complete_activity(&mut self) {
        let event = self.event_rx.recv().await.unwrap();
        self.process(vec![event]).await;
    }

    /// Move the clock to the earliest armed timer and fire it.
    pub async fn fire_next_timer(&self) {
        let scheduler = self.runtime.scheduler();
        let deadline = scheduler.lock().next_deadline().unwrap();
        self.clock.set_epoch_ms(deadline.max(self.clock.epoch_ms()));
        let fired = scheduler.lock().fired_timers(self.clock.epoch_ms());
        self.process(fired).await;
    }

    /// One unit of progress: an activity result or a timer.
    pub async fn step(&mut self) {
        if self.activity_in_flight() {
            self.complete_activity().await;
        } else {
            self.fire_next_timer().await;
        }
    }

    /// Drive until the root instance finishes.
    pub async fn drive(&mut self) -> vigil_storage::InstanceRecord {
        for _ in 0..1_000 {
            let root = self.record(ROOT);
            if root.is_terminal() {
                return root;
            }
            self.step().await;
        }
        panic!("supervision did not finish");
    }

    /// Drive until the child is sleeping between polls.
    pub async fn drive_to_first_sleep(&mut self) {
        for _ in 0..10 {
            let sleeping = self.runtime.instance(CHILD).is_some_and(|c| {
                matches!(c.pending, Some(PendingTask { task: Task::Timer { .. }, .. }))
            });
            if sleeping {
                return;
            }
            self.complete_activity().await;
        }
        panic!("child never started sleeping");
    }
}
