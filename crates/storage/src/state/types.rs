// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted record types

use serde::{Deserialize, Serialize};
use vigil_core::{
    Fault, InstanceId, InstanceKind, InstanceStatus, OrchestrationInput, Outcome, ParentLink,
    Task, TaskRecord,
};

/// A task that has been scheduled but whose result is not yet recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTask {
    pub seq: u32,
    pub task: Task,
}

/// Latest status observation, kept for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollObservation {
    pub at_ms: u64,
    /// `None` when the provider did not find the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_state: Option<String>,
    pub found: bool,
}

/// One orchestration instance as folded from its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: InstanceId,
    pub kind: InstanceKind,
    /// Input of the current generation
    pub input: OrchestrationInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentLink>,
    pub created_at_ms: u64,
    pub generation: u32,
    pub generation_started_at_ms: u64,
    /// Recorded results of the current generation, ordered by `seq`
    #[serde(default)]
    pub history: Vec<TaskRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingTask>,
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_poll: Option<PollObservation>,
    /// Status polls across all generations
    #[serde(default)]
    pub polls: u32,
}

impl InstanceRecord {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether `seq` of `generation` is the task this instance is waiting on.
    pub fn is_pending(&self, generation: u32, seq: u32) -> bool {
        self.generation == generation && self.pending.as_ref().is_some_and(|p| p.seq == seq)
    }
}
