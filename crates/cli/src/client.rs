// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection to the vigil daemon over its Unix socket.

#[path = "client_queries.rs"]
mod queries;

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::net::UnixStream;
use vigil_daemon::lifecycle::SOCKET_FILE;
use vigil_wire::{self as wire, ProtocolError, Request, Response};

use crate::daemon_process;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (start it with `vigil daemon start`)")]
    DaemonNotRunning,

    #[error("could not determine state directory: {0}")]
    StateDir(String),

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("daemon did not respond within {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::DaemonNotRunning)
    }
}

/// One request per connection, mirroring the daemon's listener.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Client for the daemon at `socket_path`.
    pub fn at(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into(), timeout: vigil_daemon::env::ipc_timeout() }
    }

    /// Connect to a running daemon; fails fast when there is no socket.
    pub fn connect() -> Result<Self, ClientError> {
        let client = Self::at(state_dir()?.join(SOCKET_FILE));
        if !client.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(client)
    }

    /// Connect, starting the daemon in the background if needed.
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect() {
            if client.ping().await.is_ok() {
                return Ok(client);
            }
        }
        let state_dir = state_dir()?;
        daemon_process::start_background(&state_dir).await?;
        Ok(Self::at(state_dir.join(SOCKET_FILE)))
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub(crate) async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let exchange = async {
            let mut stream = UnixStream::connect(&self.socket_path).await.map_err(not_running)?;
            wire::write_message(&mut stream, &wire::encode(request)?).await?;
            let bytes = wire::read_message(&mut stream).await?;
            Ok::<_, ClientError>(wire::decode::<Response>(&bytes)?)
        };
        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }

    /// Turn an error or mismatched response into a `ClientError`.
    pub(crate) fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Err(ClientError::UnexpectedResponse(format!("{other:?}"))),
        }
    }
}

fn not_running(e: std::io::Error) -> ClientError {
    match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
            ClientError::DaemonNotRunning
        }
        _ => ClientError::Io(e),
    }
}

pub(crate) fn state_dir() -> Result<PathBuf, ClientError> {
    vigil_daemon::env::state_dir().map_err(|e| ClientError::StateDir(e.to_string()))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
