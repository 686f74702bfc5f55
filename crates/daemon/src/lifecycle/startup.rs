// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and recovery.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use parking_lot::Mutex;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{info, warn};
use vigil_adapters::JobControlBackend;
use vigil_core::{Event, SystemClock};
use vigil_engine::{Runtime, RuntimeDeps};
use vigil_storage::{load_snapshot, MaterializedState, Wal};

use crate::event_bus::EventBus;

use super::{Config, DaemonState, LifecycleError, StartupResult};

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // A failed lock means the files belong to a running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Lock before touching anything else. Open without truncating so a
    // losing race does not wipe the running daemon's PID.
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    let (mut state, snapshot_seq) = match load_snapshot(&config.snapshot_path)? {
        Some(snapshot) => {
            info!(
                seq = snapshot.seq,
                instances = snapshot.state.instances.len(),
                running = snapshot.running_roots(),
                "loaded snapshot"
            );
            (snapshot.state, snapshot.seq)
        }
        None => {
            info!("No snapshot found, starting with empty state");
            (MaterializedState::default(), 0)
        }
    };

    let mut wal = Wal::open(&config.wal_path, snapshot_seq)?;
    let replay = wal.entries_after(snapshot_seq)?;
    let replay_count = replay.len();
    for entry in replay {
        state.apply_event(&entry.event);
    }
    // Replayed entries are folded into state; in-flight work is re-issued
    // from state by `DaemonState::resume` instead of re-handling history.
    let write_seq = wal.write_seq();
    wal.mark_processed(write_seq);
    if replay_count > 0 {
        info!("Replayed {} events from WAL after seq {}", replay_count, snapshot_seq);
    }

    let running = state.instances.values().filter(|r| !r.is_terminal()).count();
    info!("Recovered state: {} instances, {} running", state.instances.len(), running);

    let (event_bus, event_reader) = EventBus::new(wal);

    let jobs = JobControlBackend::from_config(&config.provider).await?;
    info!(provider = jobs.name(), "job control ready");

    // Activity results arrive on this channel and are forwarded to the WAL.
    let (internal_tx, internal_rx) = mpsc::channel::<Event>(100);
    spawn_runtime_event_forwarder(internal_rx, event_bus.clone());

    // Bind last, once everything above has validated.
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let state = Arc::new(Mutex::new(state));
    let runtime = Arc::new(Runtime::new(
        RuntimeDeps { jobs, state: Arc::clone(&state) },
        SystemClock,
        internal_tx,
    ));

    info!("Daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            state,
            runtime,
            event_bus,
            start_time: Instant::now(),
            last_checkpoint_seq: snapshot_seq,
        },
        listener,
        event_reader,
    })
}

/// Forward runtime events to the event bus, flushing after each batch.
fn spawn_runtime_event_forwarder(mut rx: mpsc::Receiver<Event>, event_bus: EventBus) {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if event_bus.send(event).is_err() {
                warn!("Failed to forward runtime event to WAL");
                continue;
            }
            while let Ok(event) = rx.try_recv() {
                if event_bus.send(event).is_err() {
                    warn!("Failed to forward runtime event to WAL");
                }
            }
            if let Err(e) = event_bus.wal.lock().flush() {
                tracing::error!("Failed to flush runtime events: {}", e);
            }
        }
    });
}

fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.version_path, &config.lock_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
