// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job control: the four calls every activity is built from

pub mod aci;
mod fake;

pub use aci::AciJobControl;
pub use fake::{FakeCall, FakeFailure, FakeJob, FakeJobControl, FakeScript, StatusStep};

use crate::config::{ProviderConfig, ProviderKind};
use crate::credential::CredentialError;
use async_trait::async_trait;
use thiserror::Error;
use vigil_core::{ActivityError, ActivityErrorKind, JobStatusSnapshot, JobTarget};

#[derive(Debug, Error)]
pub enum JobControlError {
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("provider unavailable: {0}")]
    Transient(String),
    #[error("provider rejected request: {0}")]
    Rejected(String),
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

impl JobControlError {
    pub fn is_transient(&self) -> bool {
        match self {
            JobControlError::Transient(_) => true,
            JobControlError::Credential(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<JobControlError> for ActivityError {
    fn from(err: JobControlError) -> Self {
        let kind = match &err {
            JobControlError::NotFound(_) => ActivityErrorKind::TargetNotFound,
            e if e.is_transient() => ActivityErrorKind::Transient,
            _ => ActivityErrorKind::Fatal,
        };
        ActivityError::new(kind, err.to_string())
    }
}

/// Operations on a remote job. All are safe to repeat.
#[async_trait]
pub trait JobControl: Clone + Send + Sync + 'static {
    async fn stop(&self, target: &JobTarget) -> Result<(), JobControlError>;

    async fn start(&self, target: &JobTarget) -> Result<(), JobControlError>;

    /// `Ok(None)` when the provider does not know the job.
    async fn get_status(
        &self,
        target: &JobTarget,
    ) -> Result<Option<JobStatusSnapshot>, JobControlError>;

    /// Logs of `container`, or of the container named after the group.
    async fn get_logs(
        &self,
        target: &JobTarget,
        container: Option<&str>,
    ) -> Result<String, JobControlError>;
}

/// The provider selected by configuration.
#[derive(Clone)]
pub enum JobControlBackend {
    Aci(AciJobControl),
    Fake(FakeJobControl),
}

impl JobControlBackend {
    /// Resolve credentials and build the configured provider.
    pub async fn from_config(config: &ProviderConfig) -> Result<Self, JobControlError> {
        match config.kind {
            ProviderKind::Aci => Ok(Self::Aci(AciJobControl::connect(config).await?)),
            ProviderKind::Fake => {
                let fake = match &config.fake_script {
                    Some(path) => FakeJobControl::from_script_file(path)?,
                    None => FakeJobControl::new(),
                };
                Ok(Self::Fake(fake))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobControlBackend::Aci(_) => "aci",
            JobControlBackend::Fake(_) => "fake",
        }
    }
}

#[async_trait]
impl JobControl for JobControlBackend {
    async fn stop(&self, target: &JobTarget) -> Result<(), JobControlError> {
        match self {
            JobControlBackend::Aci(c) => c.stop(target).await,
            JobControlBackend::Fake(c) => c.stop(target).await,
        }
    }

    async fn start(&self, target: &JobTarget) -> Result<(), JobControlError> {
        match self {
            JobControlBackend::Aci(c) => c.start(target).await,
            JobControlBackend::Fake(c) => c.start(target).await,
        }
    }

    async fn get_status(
        &self,
        target: &JobTarget,
    ) -> Result<Option<JobStatusSnapshot>, JobControlError> {
        match self {
            JobControlBackend::Aci(c) => c.get_status(target).await,
            JobControlBackend::Fake(c) => c.get_status(target).await,
        }
    }

    async fn get_logs(
        &self,
        target: &JobTarget,
        container: Option<&str>,
    ) -> Result<String, JobControlError> {
        match self {
            JobControlBackend::Aci(c) => c.get_logs(target, container).await,
            JobControlBackend::Fake(c) => c.get_logs(target, container).await,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
