// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervision request settings read from the environment and flags.
//!
//! Environment names follow the function-app settings operators already
//! have (`ResourceGroup`, `ACIGroup`, ...), with `VIGIL_*` aliases. Values
//! are read once; flags given on the command line take precedence.

use thiserror::Error;
use vigil_core::{
    ContainerPolicy, JobTarget, PolicyError, SupervisionPolicy, SupervisionRequest,
    SupervisionTuning,
};

const RESOURCE_GROUP: &[&str] = &["VIGIL_RESOURCE_GROUP", "ResourceGroup"];
const JOB_GROUP: &[&str] = &["VIGIL_JOB_GROUP", "ACIGroup"];
const INTERVAL: &[&str] = &["VIGIL_POLLING_INTERVAL_MINUTES", "PollingIntervalInMinutes"];
const MAX: &[&str] = &["VIGIL_MAX_PROCESSING_TIME_MINUTES", "MaxProcessingTimeInMinutes"];
const CONTAINER_POLICY: &[&str] = &["VIGIL_CONTAINER_POLICY"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestConfigError {
    #[error("{0} is not set (use the flag or the {1} environment variable)")]
    Missing(&'static str, &'static str),

    #[error("{name} must be a whole number of minutes, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("{0}")]
    ContainerPolicy(String),
}

/// Partially specified request; each field may come from env or a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    pub resource_group: Option<String>,
    pub job_group: Option<String>,
    pub polling_interval_minutes: Option<u32>,
    pub max_processing_time_minutes: Option<u32>,
    pub container_policy: Option<ContainerPolicy>,
}

impl RequestConfig {
    pub fn from_env() -> Result<Self, RequestConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RequestConfigError> {
        let get = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| lookup(n))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let minutes = |names: &[&'static str]| -> Result<Option<u32>, RequestConfigError> {
            get(names)
                .map(|value| {
                    value
                        .parse::<u32>()
                        .map_err(|_| RequestConfigError::InvalidNumber { name: names[1], value })
                })
                .transpose()
        };

        Ok(Self {
            resource_group: get(RESOURCE_GROUP),
            job_group: get(JOB_GROUP),
            polling_interval_minutes: minutes(INTERVAL)?,
            max_processing_time_minutes: minutes(MAX)?,
            container_policy: get(CONTAINER_POLICY)
                .map(|v| v.parse::<ContainerPolicy>())
                .transpose()
                .map_err(RequestConfigError::ContainerPolicy)?,
        })
    }

    /// Fields set in `flags` replace those read from the environment.
    pub fn overridden_by(self, flags: RequestConfig) -> Self {
        Self {
            resource_group: flags.resource_group.or(self.resource_group),
            job_group: flags.job_group.or(self.job_group),
            polling_interval_minutes: flags
                .polling_interval_minutes
                .or(self.polling_interval_minutes),
            max_processing_time_minutes: flags
                .max_processing_time_minutes
                .or(self.max_processing_time_minutes),
            container_policy: flags.container_policy.or(self.container_policy),
        }
    }

    pub fn build(self) -> Result<SupervisionRequest, RequestConfigError> {
        let resource_group =
            self.resource_group.ok_or(RequestConfigError::Missing("resource group", RESOURCE_GROUP[1]))?;
        let job_group =
            self.job_group.ok_or(RequestConfigError::Missing("job group", JOB_GROUP[1]))?;
        let interval = self
            .polling_interval_minutes
            .ok_or(RequestConfigError::Missing("polling interval", INTERVAL[1]))?;
        let max = self
            .max_processing_time_minutes
            .ok_or(RequestConfigError::Missing("max processing time", MAX[1]))?;

        let tuning = SupervisionTuning {
            container_policy: self.container_policy.unwrap_or_default(),
            ..SupervisionTuning::default()
        };
        Ok(SupervisionRequest::new(
            JobTarget::new(resource_group, job_group),
            SupervisionPolicy::new(interval, max)?,
        )
        .with_tuning(tuning))
    }
}

#[cfg(test)]
#[path = "request_config_tests.rs"]
mod tests;
