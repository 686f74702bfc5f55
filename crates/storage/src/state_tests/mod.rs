// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vigil_core::test_support::{
    request, status_result, supervise_created_event, task_completed_event,
};
use vigil_core::{
    Activity, Fault, FaultKind, InstanceKind, InstanceStatus, OrchestrationInput, Outcome,
    ParentLink, PollCycleState, Task, TaskResult,
};

const ROOT: &str = "sup-root";
const CHILD: &str = "sup-root-1";

fn created_state() -> MaterializedState {
    let mut state = MaterializedState::default();
    state.apply_event(&supervise_created_event(ROOT, request(1, 10), 1_000));
    state
}

fn with_child(state: &mut MaterializedState) {
    let input = OrchestrationInput::AwaitExit(PollCycleState {
        deadline_ms: 601_000,
        request: request(1, 10),
    });
    state.apply_event(&Event::InstanceCreated {
        id: InstanceId::from_string(CHILD),
        kind: InstanceKind::AwaitExit,
        input,
        parent: Some(ParentLink { id: InstanceId::from_string(ROOT), generation: 0, seq: 1 }),
        created_at_ms: 1_500,
    });
}

fn scheduled(id: &str, generation: u32, seq: u32, task: Task) -> Event {
    Event::TaskScheduled { id: InstanceId::from_string(id), generation, seq, task }
}

fn record<'a>(state: &'a MaterializedState, id: &str) -> &'a InstanceRecord {
    state.instances.get(id).unwrap()
}

#[test]
fn created_instance_starts_running_at_generation_zero() {
    let state = created_state();
    let root = record(&state, ROOT);
    assert_eq!(root.status, InstanceStatus::Running);
    assert_eq!(root.generation, 0);
    assert_eq!(root.generation_started_at_ms, 1_000);
    assert!(root.history.is_empty());
}

#[test]
fn duplicate_create_is_ignored() {
    let mut state = created_state();
    state.apply_event(&scheduled(ROOT, 0, 0, Task::activity(Activity::StartJob)));
    state.apply_event(&supervise_created_event(ROOT, request(5, 50), 9_000));

    let root = record(&state, ROOT);
    assert_eq!(root.created_at_ms, 1_000);
    assert!(root.pending.is_some());
}

#[test]
fn schedule_then_complete_records_history() {
    let mut state = created_state();
    state.apply_event(&scheduled(ROOT, 0, 0, Task::activity(Activity::StartJob)));
    assert!(record(&state, ROOT).is_pending(0, 0));

    let done = task_completed_event(ROOT, 0, 0, 2_000, TaskResult::TimerFired);
    state.apply_event(&done);
    state.apply_event(&done);

    let root = record(&state, ROOT);
    assert_eq!(root.history.len(), 1);
    assert_eq!(root.history[0].completed_at_ms, 2_000);
    assert!(root.pending.is_none());
}

#[yare::parameterized(
    wrong_generation = { 1, 0 },
    skipped_seq      = { 0, 1 },
)]
fn out_of_order_completion_is_ignored(generation: u32, seq: u32) {
    let mut state = created_state();
    state.apply_event(&task_completed_event(ROOT, generation, seq, 2_000, TaskResult::TimerFired));
    assert!(record(&state, ROOT).history.is_empty());
}

#[test]
fn status_results_update_last_poll_once() {
    let mut state = created_state();
    let poll = task_completed_event(ROOT, 0, 0, 3_000, status_result("Running"));
    state.apply_event(&poll);
    state.apply_event(&poll);

    let root = record(&state, ROOT);
    assert_eq!(root.polls, 1);
    let last = root.last_poll.as_ref().unwrap();
    assert_eq!(last.at_ms, 3_000);
    assert_eq!(last.lead_state.as_deref(), Some("Running"));
    assert!(last.found);
}

#[test]
fn continue_as_new_clears_history_and_bumps_generation() {
    let mut state = created_state();
    with_child(&mut state);
    state.apply_event(&task_completed_event(CHILD, 0, 0, 2_000, status_result("Running")));
    state.apply_event(&task_completed_event(CHILD, 0, 1, 62_000, TaskResult::TimerFired));

    let next_input = record(&state, CHILD).input.clone();
    let continued = Event::InstanceContinued {
        id: InstanceId::from_string(CHILD),
        generation: 1,
        input: next_input,
        at_ms: 62_000,
    };
    state.apply_event(&continued);
    state.apply_event(&continued);

    let child = record(&state, CHILD);
    assert_eq!(child.generation, 1);
    assert_eq!(child.generation_started_at_ms, 62_000);
    assert!(child.history.is_empty());
    assert_eq!(child.polls, 1);
}

#[test]
fn terminal_instance_ignores_further_events() {
    let mut state = created_state();
    state.apply_event(&Event::InstanceFailed {
        id: InstanceId::from_string(ROOT),
        fault: Fault::new(FaultKind::TargetNotFound, "rg/job"),
        at_ms: 5_000,
    });
    state.apply_event(&Event::InstanceCompleted {
        id: InstanceId::from_string(ROOT),
        outcome: Outcome::Success,
        at_ms: 6_000,
    });
    state.apply_event(&task_completed_event(ROOT, 0, 0, 7_000, TaskResult::TimerFired));

    let root = record(&state, ROOT);
    assert_eq!(root.status, InstanceStatus::Failed);
    assert_eq!(root.finished_at_ms, Some(5_000));
    assert_eq!(root.fault.as_ref().map(|f| f.kind), Some(FaultKind::TargetNotFound));
    assert!(root.history.is_empty());
}

#[test]
fn cancel_cascades_to_descendants() {
    let mut state = created_state();
    with_child(&mut state);
    state.apply_event(&scheduled(CHILD, 0, 1, Task::Timer { fire_at_ms: 60_000 }));

    state.apply_event(&Event::InstanceCancelled { id: InstanceId::from_string(ROOT), at_ms: 9 });

    for id in [ROOT, CHILD] {
        let r = record(&state, id);
        assert_eq!(r.status, InstanceStatus::Cancelled, "{id}");
        assert!(r.pending.is_none());
    }
}

#[test]
fn purge_requires_whole_tree_terminal() {
    let mut state = created_state();
    with_child(&mut state);
    state.apply_event(&Event::InstanceCompleted {
        id: InstanceId::from_string(ROOT),
        outcome: Outcome::Success,
        at_ms: 9,
    });

    state.apply_event(&Event::InstancePurged { id: InstanceId::from_string(ROOT) });
    assert_eq!(state.instances.len(), 2, "running child blocks purge");

    state.apply_event(&Event::InstanceCompleted {
        id: InstanceId::from_string(CHILD),
        outcome: Outcome::Success,
        at_ms: 9,
    });
    state.apply_event(&Event::InstancePurged { id: InstanceId::from_string(ROOT) });
    assert!(state.instances.is_empty());
}

#[test]
fn tree_navigation() {
    let mut state = created_state();
    with_child(&mut state);

    assert_eq!(state.root_of(CHILD).unwrap(), ROOT);
    assert_eq!(state.root_of(ROOT).unwrap(), ROOT);
    assert_eq!(state.subtree(ROOT), vec![InstanceId::from_string(ROOT), InstanceId::from_string(CHILD)]);
    assert_eq!(state.children_of(ROOT).len(), 1);
    assert_eq!(state.roots().len(), 1);
}

#[yare::parameterized(
    exact          = { "sup-root", Some("sup-root") },
    without_prefix = { "root-1", Some("sup-root-1") },
    exact_short    = { "root", Some("sup-root") },
    ambiguous      = { "sup-ro", None },
    unknown        = { "nope", None },
)]
fn lookup_by_prefix(query: &str, expected: Option<&str>) {
    let mut state = created_state();
    with_child(&mut state);
    assert_eq!(state.get_instance(query).map(|r| r.id.as_str()), expected);
}

#[test]
fn state_roundtrips_through_json() {
    let mut state = created_state();
    with_child(&mut state);
    state.apply_event(&task_completed_event(CHILD, 0, 0, 2_000, status_result("Running")));

    let json = serde_json::to_string(&state).unwrap();
    let parsed: MaterializedState = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, state);
}
