// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-process provider.
//!
//! Used by tests and by `VIGIL_PROVIDER=fake` for local runs. Each job
//! replays a list of status steps; the last step repeats once the list is
//! exhausted. Unknown jobs behave like jobs the provider has never heard of.

use super::{JobControl, JobControlError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use vigil_core::{ContainerStatus, JobStatusSnapshot, JobTarget, TERMINATED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FakeFailure {
    NotFound,
    Transient,
    Rejected,
}

impl FakeFailure {
    fn to_error(self, target: &JobTarget) -> JobControlError {
        match self {
            FakeFailure::NotFound => JobControlError::NotFound(target.to_string()),
            FakeFailure::Transient => {
                JobControlError::Transient(format!("{target}: service unavailable"))
            }
            FakeFailure::Rejected => JobControlError::Rejected(format!("{target}: forbidden")),
        }
    }
}

/// One scripted answer to `get_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusStep {
    /// Single container in this state
    State(String),
    /// One container per label
    Containers(Vec<String>),
    /// Provider does not know the job
    Missing,
    Fail(FakeFailure),
}

impl StatusStep {
    pub fn state(label: &str) -> Self {
        StatusStep::State(label.to_string())
    }

    pub fn terminated() -> Self {
        Self::state(TERMINATED)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakeJob {
    #[serde(default)]
    pub statuses: Vec<StatusStep>,
    #[serde(default)]
    pub logs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_failure: Option<FakeFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_failure: Option<FakeFailure>,
}

impl FakeJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(mut self, steps: impl IntoIterator<Item = StatusStep>) -> Self {
        self.statuses = steps.into_iter().collect();
        self
    }

    pub fn logs(mut self, logs: impl Into<String>) -> Self {
        self.logs = logs.into();
        self
    }

    pub fn start_failure(mut self, failure: FakeFailure) -> Self {
        self.start_failure = Some(failure);
        self
    }
}

/// File format for `VIGIL_FAKE_SCRIPT`: jobs keyed by `scope/name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FakeScript {
    #[serde(default)]
    pub jobs: HashMap<String, FakeJob>,
}

/// Recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Stop(JobTarget),
    Start(JobTarget),
    GetStatus(JobTarget),
    GetLogs(JobTarget, Option<String>),
}

struct ScriptedJob {
    job: FakeJob,
    next_status: usize,
}

#[derive(Default)]
struct FakeState {
    jobs: HashMap<JobTarget, ScriptedJob>,
    calls: Vec<FakeCall>,
}

#[derive(Clone, Default)]
pub struct FakeJobControl {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeJobControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_script(script: FakeScript) -> Result<Self, JobControlError> {
        let fake = Self::new();
        for (key, job) in script.jobs {
            let (scope, name) = key
                .split_once('/')
                .filter(|(s, n)| !s.is_empty() && !n.is_empty())
                .ok_or_else(|| JobControlError::Decode(format!("bad job key '{key}'")))?;
            fake.set_job(JobTarget::new(scope, name), job);
        }
        Ok(fake)
    }

    pub fn from_script_file(path: &Path) -> Result<Self, JobControlError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| JobControlError::Decode(format!("{}: {e}", path.display())))?;
        let script: FakeScript = serde_json::from_str(&text)
            .map_err(|e| JobControlError::Decode(format!("{}: {e}", path.display())))?;
        Self::from_script(script)
    }

    pub fn with_job(self, target: JobTarget, job: FakeJob) -> Self {
        self.set_job(target, job);
        self
    }

    /// Replace the script for `target`, restarting its status sequence.
    pub fn set_job(&self, target: JobTarget, job: FakeJob) {
        self.inner.lock().jobs.insert(target, ScriptedJob { job, next_status: 0 });
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.inner.lock().calls.clone()
    }

    pub fn start_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, FakeCall::Start(_))).count()
    }

    pub fn status_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, FakeCall::GetStatus(_))).count()
    }

    fn record(&self, call: FakeCall) {
        self.inner.lock().calls.push(call);
    }
}

fn snapshot(target: &JobTarget, labels: &[String]) -> JobStatusSnapshot {
    let containers = labels
        .iter()
        .enumerate()
        .map(|(i, label)| ContainerStatus {
            name: if i == 0 {
                target.job_group_name.clone()
            } else {
                format!("{}-{i}", target.job_group_name)
            },
            current_state_label: Some(label.clone()),
            restart_count: Some(0),
        })
        .collect();
    JobStatusSnapshot {
        instance_id: format!(
            "/subscriptions/fake/resourceGroups/{}/providers/Microsoft.ContainerInstance/containerGroups/{}",
            target.resource_scope, target.job_group_name
        ),
        display_name: target.job_group_name.clone(),
        resource_scope: target.resource_scope.clone(),
        overall_state: labels.first().cloned().unwrap_or_default(),
        containers,
    }
}

#[async_trait]
impl JobControl for FakeJobControl {
    async fn stop(&self, target: &JobTarget) -> Result<(), JobControlError> {
        self.record(FakeCall::Stop(target.clone()));
        let state = self.inner.lock();
        match state.jobs.get(target) {
            Some(_) => Ok(()),
            None => Err(JobControlError::NotFound(target.to_string())),
        }
    }

    async fn start(&self, target: &JobTarget) -> Result<(), JobControlError> {
        self.record(FakeCall::Start(target.clone()));
        let mut state = self.inner.lock();
        match state.jobs.get_mut(target) {
            Some(scripted) => match scripted.job.start_failure {
                Some(failure) => Err(failure.to_error(target)),
                None => {
                    scripted.next_status = 0;
                    Ok(())
                }
            },
            None => Err(JobControlError::NotFound(target.to_string())),
        }
    }

    async fn get_status(
        &self,
        target: &JobTarget,
    ) -> Result<Option<JobStatusSnapshot>, JobControlError> {
        self.record(FakeCall::GetStatus(target.clone()));
        let mut state = self.inner.lock();
        let Some(scripted) = state.jobs.get_mut(target) else {
            return Ok(None);
        };
        let steps = &scripted.job.statuses;
        let step = match steps.get(scripted.next_status).or_else(|| steps.last()) {
            Some(step) => step.clone(),
            None => StatusStep::state("Running"),
        };
        scripted.next_status += 1;

        match step {
            StatusStep::State(label) => Ok(Some(snapshot(target, &[label]))),
            StatusStep::Containers(labels) => Ok(Some(snapshot(target, &labels))),
            StatusStep::Missing => Ok(None),
            StatusStep::Fail(failure) => Err(failure.to_error(target)),
        }
    }

    async fn get_logs(
        &self,
        target: &JobTarget,
        container: Option<&str>,
    ) -> Result<String, JobControlError> {
        self.record(FakeCall::GetLogs(target.clone(), container.map(str::to_string)));
        let state = self.inner.lock();
        let scripted =
            state.jobs.get(target).ok_or_else(|| JobControlError::NotFound(target.to_string()))?;
        match scripted.job.logs_failure {
            Some(failure) => Err(failure.to_error(target)),
            None => Ok(scripted.job.logs.clone()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
