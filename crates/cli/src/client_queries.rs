// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request methods for DaemonClient.

use vigil_core::SupervisionRequest;
use vigil_wire::{InstanceDetail, InstanceSummary, Request, Response, PROTOCOL_VERSION};

use super::{ClientError, DaemonClient};

impl DaemonClient {
    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Daemon version via the Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: PROTOCOL_VERSION.to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    /// Trigger a supervision; returns its instance id.
    pub async fn start(&self, request: SupervisionRequest) -> Result<String, ClientError> {
        match self.send(&Request::Start { request }).await? {
            Response::Started { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self, id: &str) -> Result<Option<InstanceDetail>, ClientError> {
        match self.send(&Request::Status { id: id.to_string() }).await? {
            Response::Instance { instance } => Ok(instance.map(|b| *b)),
            other => Self::reject(other),
        }
    }

    pub async fn list(&self) -> Result<Vec<InstanceSummary>, ClientError> {
        match self.send(&Request::List).await? {
            Response::Instances { instances } => Ok(instances),
            other => Self::reject(other),
        }
    }

    /// Cancel a supervision; returns the id of the cancelled root.
    pub async fn cancel(&self, id: &str) -> Result<String, ClientError> {
        match self.send(&Request::Cancel { id: id.to_string() }).await? {
            Response::Cancelled { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn purge(&self, id: Option<&str>) -> Result<Vec<String>, ClientError> {
        match self.send(&Request::Purge { id: id.map(str::to_string) }).await? {
            Response::Purged { ids } => Ok(ids),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }
}
