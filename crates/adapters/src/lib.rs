// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the job-control provider and its credentials

pub mod config;
pub mod credential;
pub mod job_control;
pub mod subprocess;

pub use config::{AuthMode, ConfigError, ProviderConfig, ProviderKind};
pub use credential::{
    AccessToken, CredentialError, CredentialProvider, LocalTokenProvider, ManagedIdentityProvider,
};
pub use job_control::{
    AciJobControl, FakeCall, FakeFailure, FakeJob, FakeJobControl, FakeScript, JobControl,
    JobControlBackend, JobControlError, StatusStep,
};
