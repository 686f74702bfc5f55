// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime error types

use crate::executor::ExecuteError;
use thiserror::Error;

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("instance not found: {0}")]
    InstanceNotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("execute error: {0}")]
    Execute(#[from] ExecuteError),
}
