// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event_bus::EventReader;
use tempfile::TempDir;
use tokio::net::UnixStream;
use vigil_storage::Wal;

pub(super) struct TestCtx {
    pub ctx: ListenCtx,
    pub reader: EventReader,
    _dir: TempDir,
}

pub(super) fn test_ctx() -> TestCtx {
    let dir = TempDir::new().unwrap();
    let wal = Wal::open(&dir.path().join("events.wal"), 0).unwrap();
    let (event_bus, reader) = EventBus::new(wal);
    let ctx = ListenCtx {
        event_bus,
        state: Arc::new(Mutex::new(MaterializedState::default())),
        shutdown: CancellationToken::new(),
    };
    TestCtx { ctx, reader, _dir: dir }
}

/// Round-trip one request through `handle_connection` over a socket pair.
async fn exchange(ctx: &ListenCtx, request: &Request) -> Response {
    let (mut client, server) = UnixStream::pair().unwrap();
    let (server_read, server_write) = server.into_split();

    wire::write_message(&mut client, &wire::encode(request).unwrap()).await.unwrap();
    let (served, reply) = tokio::join!(
        handle_connection(server_read, server_write, ctx),
        wire::read_message(&mut client),
    );
    served.unwrap();
    wire::decode(&reply.unwrap()).unwrap()
}

#[tokio::test]
async fn ping_answers_pong() {
    let t = test_ctx();
    assert_eq!(exchange(&t.ctx, &Request::Ping).await, Response::Pong);
}

#[tokio::test]
async fn hello_reports_daemon_version() {
    let t = test_ctx();
    let response = exchange(&t.ctx, &Request::Hello { version: "0.0.0".to_string() }).await;
    assert_eq!(response, Response::Hello { version: PROTOCOL_VERSION.to_string() });
}

#[tokio::test]
async fn shutdown_cancels_the_token() {
    let t = test_ctx();
    assert_eq!(exchange(&t.ctx, &Request::Shutdown).await, Response::ShuttingDown);
    assert!(t.ctx.shutdown.is_cancelled());
}

#[tokio::test]
async fn unknown_status_returns_empty_instance() {
    let t = test_ctx();
    let response = exchange(&t.ctx, &Request::Status { id: "sup-nope".to_string() }).await;
    assert_eq!(response, Response::Instance { instance: None });
}

#[tokio::test]
async fn client_that_hangs_up_gets_no_response() {
    let t = test_ctx();
    let (mut client, server) = UnixStream::pair().unwrap();
    let (server_read, server_write) = server.into_split();

    wire::write_message(&mut client, &wire::encode(&Request::List).unwrap()).await.unwrap();
    drop(client);

    // Either the handler or the disconnect wins; neither is an error worth
    // reporting beyond a closed connection.
    match handle_connection(server_read, server_write, &t.ctx).await {
        Ok(()) => {}
        Err(ConnectionError::Protocol(_)) => {}
        Err(e) => panic!("unexpected error: {e}"),
    }
}

#[tokio::test]
async fn listener_stops_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("test.sock");
    let t = test_ctx();
    let shutdown = t.ctx.shutdown.clone();
    let listener = Listener::new(UnixListener::bind(&socket).unwrap(), Arc::new(t.ctx));

    let handle = tokio::spawn(listener.run());
    shutdown.cancel();
    tokio::time::timeout(std::time::Duration::from_secs(2), handle).await.unwrap().unwrap();
}
