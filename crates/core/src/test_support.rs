// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::orchestration::{ActivityOutput, OrchestrationInput, TaskResult};
use crate::status::{ContainerStatus, JobStatusSnapshot};
use crate::target::{JobTarget, SupervisionPolicy, SupervisionRequest};
use crate::{Event, InstanceId};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for supervision inputs.
pub mod strategies {
    use crate::target::SupervisionPolicy;
    use proptest::prelude::*;

    /// Policies with `interval <= max`, the shape operators are expected to use.
    pub fn arb_bounded_policy() -> impl Strategy<Value = SupervisionPolicy> {
        (1u32..=240).prop_flat_map(|max| {
            (1u32..=max).prop_map(move |interval| SupervisionPolicy {
                polling_interval_minutes: interval,
                max_processing_time_minutes: max,
            })
        })
    }

    /// Arbitrary log text, sometimes carrying the success marker in some casing.
    pub fn arb_log_text() -> impl Strategy<Value = String> {
        prop_oneof![
            ".{0,40}",
            (".{0,20}", "(?i)exit_code_success", ".{0,20}")
                .prop_map(|(a, marker, b)| format!("{a}{marker}{b}")),
        ]
    }
}

// ── Value factories ─────────────────────────────────────────────────────

pub fn request(interval_minutes: u32, max_minutes: u32) -> SupervisionRequest {
    SupervisionRequest::new(
        JobTarget::new("rg-test", "job-test"),
        SupervisionPolicy {
            polling_interval_minutes: interval_minutes,
            max_processing_time_minutes: max_minutes,
        },
    )
}

/// A single-container snapshot with the given state label.
pub fn snapshot(label: &str) -> JobStatusSnapshot {
    JobStatusSnapshot::builder()
        .containers(vec![ContainerStatus {
            name: "main".to_string(),
            current_state_label: Some(label.to_string()),
            restart_count: Some(0),
        }])
        .build()
}

pub fn status_result(label: &str) -> TaskResult {
    TaskResult::Activity { output: Ok(ActivityOutput::Status(Some(snapshot(label)))) }
}

pub fn logs_result(text: &str) -> TaskResult {
    TaskResult::Activity { output: Ok(ActivityOutput::Logs(text.to_string())) }
}

// ── Event factory functions ─────────────────────────────────────────────

pub fn supervise_created_event(id: &str, request: SupervisionRequest, at_ms: u64) -> Event {
    let input = OrchestrationInput::Supervise(request);
    Event::InstanceCreated {
        id: InstanceId::from_string(id),
        kind: input.kind(),
        input,
        parent: None,
        created_at_ms: at_ms,
    }
}

pub fn task_completed_event(
    id: &str,
    generation: u32,
    seq: u32,
    completed_at_ms: u64,
    result: TaskResult,
) -> Event {
    Event::TaskCompleted {
        id: InstanceId::from_string(id),
        generation,
        seq,
        completed_at_ms,
        result,
    }
}
