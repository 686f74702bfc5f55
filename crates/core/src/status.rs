// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time view of a remote job, as reported by the provider.

use crate::target::ContainerPolicy;
use serde::{Deserialize, Serialize};

/// Provider label for a container that has exited.
pub const TERMINATED: &str = "Terminated";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    /// Provider-defined state (e.g. "Running", "Waiting", "Terminated")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_count: Option<u32>,
}

impl ContainerStatus {
    pub fn is_terminated(&self) -> bool {
        self.current_state_label.as_deref() == Some(TERMINATED)
    }
}

/// Fetched fresh on every poll; decisions only ever look at the latest one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusSnapshot {
    pub instance_id: String,
    pub display_name: String,
    pub resource_scope: String,
    #[serde(default)]
    pub overall_state: String,
    #[serde(default)]
    pub containers: Vec<ContainerStatus>,
}

crate::builder! {
    pub struct JobStatusSnapshotBuilder => JobStatusSnapshot {
        into {
            instance_id: String = "/subscriptions/test/containerGroups/job",
            display_name: String = "job",
            resource_scope: String = "rg",
            overall_state: String = "Running",
        }
        set {
            containers: Vec<ContainerStatus> = Vec::new(),
        }
    }
}

impl JobStatusSnapshot {
    /// Whether the job has finished according to `policy`.
    ///
    /// A snapshot with no containers is never terminal.
    pub fn is_terminal(&self, policy: &ContainerPolicy) -> bool {
        match policy {
            ContainerPolicy::FirstContainer => {
                self.containers.first().is_some_and(ContainerStatus::is_terminated)
            }
            ContainerPolicy::AllTerminated => {
                !self.containers.is_empty()
                    && self.containers.iter().all(ContainerStatus::is_terminated)
            }
            ContainerPolicy::AnyTerminated => {
                self.containers.iter().any(ContainerStatus::is_terminated)
            }
            ContainerPolicy::Named(name) => self
                .containers
                .iter()
                .find(|c| &c.name == name)
                .is_some_and(ContainerStatus::is_terminated),
        }
    }

    /// Label of the first container, for display.
    pub fn lead_state(&self) -> Option<&str> {
        self.containers.first().and_then(|c| c.current_state_label.as_deref())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
