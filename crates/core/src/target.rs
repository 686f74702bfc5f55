// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What to supervise and how: job identity, polling policy, tuning.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Identity of the remote job. Every activity call is addressed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobTarget {
    /// Hosting environment (e.g. an Azure resource group)
    pub resource_scope: String,
    /// Name of the job (e.g. a container group)
    pub job_group_name: String,
}

impl JobTarget {
    pub fn new(resource_scope: impl Into<String>, job_group_name: impl Into<String>) -> Self {
        Self { resource_scope: resource_scope.into(), job_group_name: job_group_name.into() }
    }
}

impl fmt::Display for JobTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_scope, self.job_group_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("polling interval must be at least one minute")]
    ZeroInterval,
    #[error("max processing time must be at least one minute")]
    ZeroMaxProcessingTime,
}

/// Operator-chosen cadence and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionPolicy {
    pub polling_interval_minutes: u32,
    pub max_processing_time_minutes: u32,
}

impl SupervisionPolicy {
    pub fn new(
        polling_interval_minutes: u32,
        max_processing_time_minutes: u32,
    ) -> Result<Self, PolicyError> {
        if polling_interval_minutes == 0 {
            return Err(PolicyError::ZeroInterval);
        }
        if max_processing_time_minutes == 0 {
            return Err(PolicyError::ZeroMaxProcessingTime);
        }
        Ok(Self { polling_interval_minutes, max_processing_time_minutes })
    }

    /// An interval longer than the budget permits at most one poll.
    pub fn interval_exceeds_max(&self) -> bool {
        self.polling_interval_minutes > self.max_processing_time_minutes
    }

    pub fn polling_interval(&self) -> Duration {
        minutes(self.polling_interval_minutes)
    }

    pub fn max_processing_time(&self) -> Duration {
        minutes(self.max_processing_time_minutes)
    }

    /// Upper bound on poll-loop generations before a terminal outcome.
    pub fn max_generations(&self) -> u32 {
        self.max_processing_time_minutes.div_ceil(self.polling_interval_minutes) + 1
    }
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}

/// Which containers decide that the job has finished.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "name")]
pub enum ContainerPolicy {
    /// Only the first reported container is consulted
    #[default]
    FirstContainer,
    AllTerminated,
    AnyTerminated,
    /// The container with this name
    Named(String),
}

impl ContainerPolicy {
    /// Container to read logs from; `None` means the one named after the group.
    pub fn log_container(&self) -> Option<&str> {
        match self {
            ContainerPolicy::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerPolicy::FirstContainer => f.write_str("first"),
            ContainerPolicy::AllTerminated => f.write_str("all"),
            ContainerPolicy::AnyTerminated => f.write_str("any"),
            ContainerPolicy::Named(name) => write!(f, "name:{name}"),
        }
    }
}

impl FromStr for ContainerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(ContainerPolicy::FirstContainer),
            "all" => Ok(ContainerPolicy::AllTerminated),
            "any" => Ok(ContainerPolicy::AnyTerminated),
            other => match other.strip_prefix("name:") {
                Some(name) if !name.is_empty() => Ok(ContainerPolicy::Named(name.to_string())),
                _ => Err(format!(
                    "invalid container policy '{other}' (expected first, all, any or name:<container>)"
                )),
            },
        }
    }
}

/// Knobs with sensible defaults; rarely changed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionTuning {
    #[serde(default)]
    pub status_retry: RetryPolicy,
    /// Pause between stopping and starting the job
    #[serde(default = "default_settle_delay", with = "crate::duration_serde")]
    pub settle_delay: Duration,
    #[serde(default)]
    pub container_policy: ContainerPolicy,
    /// How long a missing job is treated as "not yet visible" after the loop starts
    #[serde(default = "default_not_found_grace", with = "crate::duration_serde")]
    pub not_found_grace: Duration,
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_not_found_grace() -> Duration {
    Duration::from_secs(5 * 60)
}

impl Default for SupervisionTuning {
    fn default() -> Self {
        Self {
            status_retry: RetryPolicy::status_check(),
            settle_delay: default_settle_delay(),
            container_policy: ContainerPolicy::default(),
            not_found_grace: default_not_found_grace(),
        }
    }
}

/// The single input of a supervision. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionRequest {
    pub target: JobTarget,
    pub policy: SupervisionPolicy,
    #[serde(default)]
    pub tuning: SupervisionTuning,
}

impl SupervisionRequest {
    pub fn new(target: JobTarget, policy: SupervisionPolicy) -> Self {
        Self { target, policy, tuning: SupervisionTuning::default() }
    }

    pub fn with_tuning(self, tuning: SupervisionTuning) -> Self {
        Self { tuning, ..self }
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
