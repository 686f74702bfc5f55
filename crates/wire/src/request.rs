// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use vigil_core::SupervisionRequest;

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Trigger a new supervision
    Start { request: SupervisionRequest },

    /// One supervision (exact id or unique prefix)
    Status { id: String },

    /// All supervisions, newest first
    List,

    /// Cancel a supervision and everything under it
    Cancel { id: String },

    /// Remove finished supervisions (one, or all when `id` is absent)
    Purge {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Request daemon shutdown
    Shutdown,
}

impl Request {
    /// Read-only requests are logged at debug level (frequent polling)
    pub fn is_query(&self) -> bool {
        matches!(self, Request::Ping | Request::Status { .. } | Request::List)
    }
}
