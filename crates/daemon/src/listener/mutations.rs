// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation handlers for state-changing requests.

use tracing::{info, warn};
use vigil_core::{
    Clock, Event, InstanceId, OrchestrationInput, SupervisionPolicy, SupervisionRequest,
    SystemClock,
};
use vigil_wire::Response;

use crate::event_bus::EventBus;

use super::{ConnectionError, ListenCtx};

/// Emit an event via the event bus.
///
/// Maps send errors to `ConnectionError::WalError`.
fn emit(event_bus: &EventBus, event: Event) -> Result<(), ConnectionError> {
    event_bus.send(event).map(|_| ()).map_err(|_| ConnectionError::WalError)
}

fn error(message: impl Into<String>) -> Result<Response, ConnectionError> {
    Ok(Response::Error { message: message.into() })
}

pub(super) fn handle_start(
    ctx: &ListenCtx,
    request: SupervisionRequest,
) -> Result<Response, ConnectionError> {
    let target = &request.target;
    if target.resource_scope.trim().is_empty() || target.job_group_name.trim().is_empty() {
        return error("resource group and job group name are required");
    }
    // Requests can arrive from any client; re-check what the CLI checked.
    let policy = &request.policy;
    if let Err(e) =
        SupervisionPolicy::new(policy.polling_interval_minutes, policy.max_processing_time_minutes)
    {
        return error(e.to_string());
    }
    if policy.interval_exceeds_max() {
        warn!(
            interval = policy.polling_interval_minutes,
            max = policy.max_processing_time_minutes,
            "polling interval exceeds max processing time; the job is checked only at start and at the deadline"
        );
    }

    let id = InstanceId::new();
    let input = OrchestrationInput::Supervise(request);
    info!(%id, target = %input.request().target, "starting supervision");
    emit(
        &ctx.event_bus,
        Event::InstanceCreated {
            id: id.clone(),
            kind: input.kind(),
            input,
            parent: None,
            created_at_ms: SystemClock.epoch_ms(),
        },
    )?;
    Ok(Response::Started { id: id.to_string() })
}

pub(super) fn handle_cancel(ctx: &ListenCtx, id: &str) -> Result<Response, ConnectionError> {
    let root = {
        let state = ctx.state.lock();
        let Some(record) = state.get_instance(id) else {
            return error(format!("supervision not found: {id}"));
        };
        let Some(root) = state.root_of(&record.id).and_then(|r| state.instances.get(r.as_str()))
        else {
            return error(format!("supervision not found: {id}"));
        };
        if root.is_terminal() {
            return error(format!("supervision {} already {}", root.id, root.status));
        }
        root.id.clone()
    };

    emit(&ctx.event_bus, Event::InstanceCancelled { id: root.clone(), at_ms: SystemClock.epoch_ms() })?;
    Ok(Response::Cancelled { id: root.to_string() })
}

/// Purge one finished supervision, or every finished one when `id` is `None`.
pub(super) fn handle_purge(ctx: &ListenCtx, id: Option<&str>) -> Result<Response, ConnectionError> {
    let roots: Vec<InstanceId> = {
        let state = ctx.state.lock();
        let finished = |root: &InstanceId| {
            state
                .subtree(root)
                .iter()
                .all(|m| state.instances.get(m.as_str()).is_some_and(|r| r.is_terminal()))
        };
        match id {
            Some(id) => {
                let Some(record) = state.get_instance(id) else {
                    return error(format!("supervision not found: {id}"));
                };
                let Some(root) = state.root_of(&record.id) else {
                    return error(format!("supervision not found: {id}"));
                };
                if !finished(&root) {
                    return error(format!("supervision {root} is still running"));
                }
                vec![root]
            }
            None => state.roots().into_iter().map(|r| r.id.clone()).filter(|r| finished(r)).collect(),
        }
    };

    for root in &roots {
        emit(&ctx.event_bus, Event::InstancePurged { id: root.clone() })?;
    }
    Ok(Response::Purged { ids: roots.iter().map(ToString::to_string).collect() })
}

#[cfg(test)]
#[path = "mutations_tests.rs"]
mod tests;
