// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event methods: name, log summary, instance id

use super::Event;
use crate::id::InstanceId;
use crate::orchestration::{ActivityOutput, TaskResult};

impl Event {
    pub fn name(&self) -> &str {
        match self {
            Event::Shutdown => "system:shutdown",
            Event::TimerFired { .. } => "timer:fired",
            Event::InstanceCreated { .. } => "instance:created",
            Event::TaskScheduled { .. } => "task:scheduled",
            Event::TaskCompleted { .. } => "task:completed",
            Event::InstanceContinued { .. } => "instance:continued",
            Event::InstanceCompleted { .. } => "instance:completed",
            Event::InstanceFailed { .. } => "instance:failed",
            Event::InstanceCancelled { .. } => "instance:cancelled",
            Event::InstancePurged { .. } => "instance:purged",
            Event::Custom => "custom",
        }
    }

    /// One-line summary with the fields worth grepping for.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::Shutdown | Event::Custom => t.to_string(),
            Event::TimerFired { id } => format!("{t} id={id}"),
            Event::InstanceCreated { id, kind, input, parent, .. } => {
                let target = &input.request().target;
                match parent {
                    Some(p) => format!("{t} id={id} kind={kind} target={target} parent={}", p.id),
                    None => format!("{t} id={id} kind={kind} target={target}"),
                }
            }
            Event::TaskScheduled { id, generation, seq, task } => {
                format!("{t} id={id} gen={generation} seq={seq} task={task}")
            }
            Event::TaskCompleted { id, generation, seq, result, .. } => {
                format!("{t} id={id} gen={generation} seq={seq} result={}", result_summary(result))
            }
            Event::InstanceContinued { id, generation, .. } => {
                format!("{t} id={id} gen={generation}")
            }
            Event::InstanceCompleted { id, outcome, .. } => format!("{t} id={id} outcome={outcome}"),
            Event::InstanceFailed { id, fault, .. } => format!("{t} id={id} fault={}", fault.kind),
            Event::InstanceCancelled { id, .. } | Event::InstancePurged { id } => {
                format!("{t} id={id}")
            }
        }
    }

    /// The instance this event belongs to, if any.
    ///
    /// Timer events are routed by parsing the timer id instead.
    pub fn instance_id(&self) -> Option<&InstanceId> {
        match self {
            Event::InstanceCreated { id, .. }
            | Event::TaskScheduled { id, .. }
            | Event::TaskCompleted { id, .. }
            | Event::InstanceContinued { id, .. }
            | Event::InstanceCompleted { id, .. }
            | Event::InstanceFailed { id, .. }
            | Event::InstanceCancelled { id, .. }
            | Event::InstancePurged { id } => Some(id),
            Event::Shutdown | Event::TimerFired { .. } | Event::Custom => None,
        }
    }
}

fn result_summary(result: &TaskResult) -> &'static str {
    match result {
        TaskResult::Activity { output: Ok(ActivityOutput::Started) } => "started",
        TaskResult::Activity { output: Ok(ActivityOutput::Status(Some(_))) } => "status",
        TaskResult::Activity { output: Ok(ActivityOutput::Status(None)) } => "not_found",
        TaskResult::Activity { output: Ok(ActivityOutput::Logs(_)) } => "logs",
        TaskResult::Activity { output: Err(_) } => "error",
        TaskResult::TimerFired => "timer_fired",
        TaskResult::ChildFinished { result: Ok(_) } => "child_completed",
        TaskResult::ChildFinished { result: Err(_) } => "child_failed",
    }
}
