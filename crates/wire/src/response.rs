// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::{InstanceDetail, InstanceSummary};

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    /// Supervision accepted
    Started { id: String },

    /// Single supervision details
    Instance { instance: Option<Box<InstanceDetail>> },

    /// List of supervisions
    Instances { instances: Vec<InstanceSummary> },

    /// Cancellation accepted for the root of the tree
    Cancelled { id: String },

    /// Supervisions removed from state
    Purged { ids: Vec<String> },

    /// Error response
    Error { message: String },
}
