// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only query handlers.

use vigil_storage::{InstanceRecord, MaterializedState};
use vigil_wire::{InstanceDetail, InstanceSummary, Response};

use super::ListenCtx;

pub(super) fn handle_status(ctx: &ListenCtx, id: &str) -> Response {
    let state = ctx.state.lock();
    let root = state
        .get_instance(id)
        .and_then(|record| state.root_of(&record.id))
        .and_then(|root| state.instances.get(root.as_str()));
    Response::Instance { instance: root.map(|r| Box::new(detail(&state, r))) }
}

pub(super) fn handle_list(ctx: &ListenCtx) -> Response {
    let state = ctx.state.lock();
    Response::Instances { instances: state.roots().into_iter().map(summary).collect() }
}

fn summary(root: &InstanceRecord) -> InstanceSummary {
    InstanceSummary {
        id: root.id.to_string(),
        target: root.input.request().target.to_string(),
        status: root.status,
        outcome: root.outcome.clone(),
        created_at_ms: root.created_at_ms,
        finished_at_ms: root.finished_at_ms,
    }
}

/// Operator view of a supervision: the root's verdict plus the progress of
/// its polling child, if it has one yet.
fn detail(state: &MaterializedState, root: &InstanceRecord) -> InstanceDetail {
    let policy = &root.input.request().policy;
    let poller = state.children_of(&root.id).into_iter().last();
    let last_poll = poller.and_then(|p| p.last_poll.as_ref());

    InstanceDetail {
        id: root.id.to_string(),
        target: root.input.request().target.to_string(),
        status: root.status,
        outcome: root.outcome.clone(),
        fault: root.fault.clone(),
        polling_interval_minutes: policy.polling_interval_minutes,
        max_processing_time_minutes: policy.max_processing_time_minutes,
        created_at_ms: root.created_at_ms,
        finished_at_ms: root.finished_at_ms,
        deadline_ms: poller.and_then(|p| p.input.deadline_ms()),
        polls: poller.map_or(0, |p| p.polls),
        generation: poller.map_or(0, |p| p.generation),
        last_state: last_poll.and_then(|p| p.lead_state.clone()),
        last_poll_at_ms: last_poll.map(|p| p.at_ms),
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
