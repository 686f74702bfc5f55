// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the system needs to perform

use crate::event::Event;
use crate::id::InstanceId;
use crate::orchestration::Activity;
use crate::retry::RetryPolicy;
use crate::target::JobTarget;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effects that need to be executed by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Event emission ===
    /// Emit an event into the system event bus
    Emit { event: Event },

    // === Activity effects ===
    /// Run an activity in the background; its result comes back as `task:completed`
    CallActivity {
        instance: InstanceId,
        generation: u32,
        seq: u32,
        activity: Activity,
        target: JobTarget,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry: Option<RetryPolicy>,
        /// Container to read logs from (logs activity only)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<String>,
        /// Pause between stop and start (start activity only)
        #[serde(with = "crate::duration_serde")]
        settle: Duration,
    },

    // === Timer effects ===
    /// Arm a timer at an absolute wall-clock time
    SetTimer { id: TimerId, fire_at_ms: u64 },

    /// Cancel a timer
    CancelTimer { id: TimerId },
}

impl Effect {
    /// Effect name for log spans (e.g., "call_activity", "set_timer")
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit { .. } => "emit",
            Effect::CallActivity { .. } => "call_activity",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit { event } => vec![("event", event.log_summary())],
            Effect::CallActivity { instance, generation, seq, activity, target, retry, .. } => {
                let mut fields = vec![
                    ("instance", instance.to_string()),
                    ("gen", generation.to_string()),
                    ("seq", seq.to_string()),
                    ("activity", activity.to_string()),
                    ("target", target.to_string()),
                ];
                if let Some(retry) = retry {
                    fields.push(("max_attempts", retry.max_attempts.to_string()));
                }
                fields
            }
            Effect::SetTimer { id, fire_at_ms } => {
                vec![("timer_id", id.to_string()), ("fire_at_ms", fire_at_ms.to_string())]
            }
            Effect::CancelTimer { id } => vec![("timer_id", id.to_string())],
        }
    }

    /// Whether to show both 'started' and 'completed' or just 'executed',
    /// to control the verbosity for frequent events.
    pub fn verbose(&self) -> bool {
        match self {
            Effect::Emit { .. } => false,
            Effect::SetTimer { .. } => false,
            Effect::CancelTimer { .. } => false,
            Effect::CallActivity { .. } => true,
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
