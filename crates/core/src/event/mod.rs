// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types for the supervision host

mod methods;

use crate::id::InstanceId;
use crate::orchestration::{InstanceKind, OrchestrationInput, ParentLink, Task, TaskResult};
use crate::outcome::{Fault, Outcome};
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};

/// Events that trigger state transitions in the system.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
/// Unknown type tags deserialize to `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "system:shutdown")]
    Shutdown,

    /// Transient scheduler signal; converted into a `task:completed`
    #[serde(rename = "timer:fired")]
    TimerFired { id: TimerId },

    #[serde(rename = "instance:created")]
    InstanceCreated {
        id: InstanceId,
        kind: InstanceKind,
        input: OrchestrationInput,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<ParentLink>,
        created_at_ms: u64,
    },

    #[serde(rename = "task:scheduled")]
    TaskScheduled { id: InstanceId, generation: u32, seq: u32, task: Task },

    #[serde(rename = "task:completed")]
    TaskCompleted {
        id: InstanceId,
        generation: u32,
        seq: u32,
        completed_at_ms: u64,
        result: TaskResult,
    },

    /// Continue-as-new: history cleared, generation bumped
    #[serde(rename = "instance:continued")]
    InstanceContinued { id: InstanceId, generation: u32, input: OrchestrationInput, at_ms: u64 },

    #[serde(rename = "instance:completed")]
    InstanceCompleted { id: InstanceId, outcome: Outcome, at_ms: u64 },

    #[serde(rename = "instance:failed")]
    InstanceFailed { id: InstanceId, fault: Fault, at_ms: u64 },

    /// Cancels the instance and every descendant
    #[serde(rename = "instance:cancelled")]
    InstanceCancelled { id: InstanceId, at_ms: u64 },

    /// Removes a terminal instance from state
    #[serde(rename = "instance:purged")]
    InstancePurged { id: InstanceId },

    /// Catch-all for unknown event types (extensibility)
    #[serde(other, skip_serializing)]
    Custom,
}
