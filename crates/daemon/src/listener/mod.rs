// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and
//! handling them without blocking the engine loop. Mutations become events
//! on the EventBus; queries read the materialized state directly.

mod mutations;
mod query;

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vigil_storage::MaterializedState;
use vigil_wire::{self as wire, ProtocolError, Request, Response, PROTOCOL_VERSION};

use crate::env::ipc_timeout;
use crate::event_bus::EventBus;

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub event_bus: EventBus,
    pub state: Arc<Mutex<MaterializedState>>,
    /// Cancelled when a client asks the daemon to stop
    pub shutdown: CancellationToken,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("WAL error")]
    WalError,
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Accept connections until shutdown, one task per connection.
    pub async fn run(self) {
        loop {
            tokio::select! {
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) = handle_connection(reader, writer, &ctx).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
                _ = self.ctx.shutdown.cancelled() => break,
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => debug!("Client disconnected"),
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection: one request, one response.
///
/// The handler is raced against client disconnect so an impatient client
/// (for example a CLI that timed out) does not leave work behind.
pub(crate) async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let request = wire::read_request(&mut reader, ipc_timeout()).await?;

    if request.is_query() {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = tokio::select! {
        result = handle_request(request, ctx) => result?,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("Client disconnected before response");
            return Ok(());
        }
    };

    debug!("Sending response: {:?}", response);
    wire::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

/// Resolves once the client closes its end (EOF after the request).
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

async fn handle_request(request: Request, ctx: &ListenCtx) -> Result<Response, ConnectionError> {
    match request {
        Request::Ping => Ok(Response::Pong),

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Ok(Response::Hello { version: PROTOCOL_VERSION.to_string() })
        }

        Request::Start { request } => mutations::handle_start(ctx, request),

        Request::Status { id } => Ok(query::handle_status(ctx, &id)),

        Request::List => Ok(query::handle_list(ctx)),

        Request::Cancel { id } => mutations::handle_cancel(ctx, &id),

        Request::Purge { id } => mutations::handle_purge(ctx, id.as_deref()),

        Request::Shutdown => {
            ctx.shutdown.cancel();
            Ok(Response::ShuttingDown)
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
