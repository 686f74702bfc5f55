// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestration instances, the tasks they schedule, and recorded results.
//!
//! An instance's history is the ordered list of [`TaskRecord`]s for its
//! current generation. Continue-as-new starts a new generation with an empty
//! history and a fresh input.

use crate::id::InstanceId;
use crate::outcome::{Fault, FaultKind, Outcome};
use crate::retry::RetryPolicy;
use crate::status::JobStatusSnapshot;
use crate::target::SupervisionRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which decision function drives an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    /// Outer orchestration: start the job once, then delegate polling
    Supervise,
    /// Inner polling loop, one generation per poll
    AwaitExit,
}

crate::simple_display! {
    InstanceKind {
        Supervise => "supervise",
        AwaitExit => "await_exit",
    }
}

/// Carried unchanged through every continuation of the polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCycleState {
    pub deadline_ms: u64,
    pub request: SupervisionRequest,
}

impl PollCycleState {
    /// Logical time at which the polling loop was entered.
    pub fn loop_started_ms(&self) -> u64 {
        let max_ms = self.request.policy.max_processing_time().as_millis() as u64;
        self.deadline_ms.saturating_sub(max_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationInput {
    Supervise(SupervisionRequest),
    AwaitExit(PollCycleState),
}

impl OrchestrationInput {
    pub fn kind(&self) -> InstanceKind {
        match self {
            OrchestrationInput::Supervise(_) => InstanceKind::Supervise,
            OrchestrationInput::AwaitExit(_) => InstanceKind::AwaitExit,
        }
    }

    pub fn request(&self) -> &SupervisionRequest {
        match self {
            OrchestrationInput::Supervise(request) => request,
            OrchestrationInput::AwaitExit(state) => &state.request,
        }
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        match self {
            OrchestrationInput::Supervise(_) => None,
            OrchestrationInput::AwaitExit(state) => Some(state.deadline_ms),
        }
    }
}

/// The only points of real I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Stop, settle, start
    StartJob,
    GetStatus,
    GetLogs,
}

crate::simple_display! {
    Activity {
        StartJob => "start_job",
        GetStatus => "get_status",
        GetLogs => "get_logs",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityOutput {
    Started,
    /// `None` when the provider does not know the job (yet)
    Status(Option<JobStatusSnapshot>),
    Logs(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityErrorKind {
    TargetNotFound,
    /// Worth retrying (network, throttling, provider 5xx)
    Transient,
    /// A transient failure that outlived its retry policy
    RetriesExhausted,
    Fatal,
}

crate::simple_display! {
    ActivityErrorKind {
        TargetNotFound => "target_not_found",
        Transient => "transient",
        RetriesExhausted => "retries_exhausted",
        Fatal => "fatal",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityError {
    pub kind: ActivityErrorKind,
    pub message: String,
}

impl ActivityError {
    pub fn new(kind: ActivityErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == ActivityErrorKind::Transient
    }

    /// Escalate a transient failure once its retry budget is spent.
    pub fn exhausted(self, attempts: u32) -> Self {
        match self.kind {
            ActivityErrorKind::Transient => Self::new(
                ActivityErrorKind::RetriesExhausted,
                format!("{} (after {attempts} attempts)", self.message),
            ),
            _ => self,
        }
    }

    /// The terminal fault an orchestration raises for this error.
    pub fn into_fault(self) -> Fault {
        let kind = match self.kind {
            ActivityErrorKind::TargetNotFound => FaultKind::TargetNotFound,
            ActivityErrorKind::RetriesExhausted => FaultKind::RetriesExhausted,
            ActivityErrorKind::Transient | ActivityErrorKind::Fatal => FaultKind::Activity,
        };
        Fault::new(kind, self.message)
    }
}

impl fmt::Display for ActivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Unit of work an orchestration waits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Task {
    Activity {
        activity: Activity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry: Option<RetryPolicy>,
    },
    /// Durable sleep until an absolute wall-clock time
    Timer { fire_at_ms: u64 },
    SubOrchestration { child_id: InstanceId, input: OrchestrationInput },
}

impl Task {
    pub fn activity(activity: Activity) -> Self {
        Task::Activity { activity, retry: None }
    }

    pub fn activity_with_retry(activity: Activity, retry: RetryPolicy) -> Self {
        Task::Activity { activity, retry: Some(retry) }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::Activity { .. } => "activity",
            Task::Timer { .. } => "timer",
            Task::SubOrchestration { .. } => "sub_orchestration",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Activity { activity, .. } => write!(f, "activity:{activity}"),
            Task::Timer { fire_at_ms } => write!(f, "timer@{fire_at_ms}"),
            Task::SubOrchestration { child_id, .. } => write!(f, "child:{child_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskResult {
    Activity { output: Result<ActivityOutput, ActivityError> },
    TimerFired,
    ChildFinished { result: Result<Outcome, Fault> },
}

/// A completed task as recorded in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub seq: u32,
    pub completed_at_ms: u64,
    pub result: TaskResult,
}

/// Where a sub-orchestration reports back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub id: InstanceId,
    pub generation: u32,
    pub seq: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    InstanceStatus {
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl InstanceStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InstanceStatus::Running)
    }
}

#[cfg(test)]
#[path = "orchestration_tests.rs"]
mod tests;
