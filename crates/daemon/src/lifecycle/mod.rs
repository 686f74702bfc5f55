// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};
use vigil_adapters::{ConfigError, JobControlBackend, JobControlError, ProviderConfig};
use vigil_core::{Clock, Event, SystemClock};
use vigil_engine::Runtime;
use vigil_storage::{Checkpointer, MaterializedState};

use crate::event_bus::{EventBus, EventReader};

/// Socket file name under the state directory
pub const SOCKET_FILE: &str = "daemon.sock";
/// Log file name under the state directory
pub const LOG_FILE: &str = "daemon.log";

/// Daemon runtime with concrete adapter types
pub type DaemonRuntime = Runtime<JobControlBackend, SystemClock>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/vigil)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to WAL file
    pub wal_path: PathBuf,
    /// Path to snapshot file
    pub snapshot_path: PathBuf,
    /// Job-control provider selection and credentials
    pub provider: ProviderConfig,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Paths live under `~/.local/state/vigil/` (or `$XDG_STATE_HOME/vigil/`,
    /// or `$VIGIL_STATE_DIR`).
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::at(crate::env::state_dir()?, ProviderConfig::from_env()?))
    }

    /// Configuration rooted at `state_dir`.
    pub fn at(state_dir: PathBuf, provider: ProviderConfig) -> Self {
        Self {
            socket_path: state_dir.join(SOCKET_FILE),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join(LOG_FILE),
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.json"),
            provider,
            state_dir,
        }
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Materialized state (shared with runtime and listener)
    pub state: Arc<Mutex<MaterializedState>>,
    pub runtime: Arc<DaemonRuntime>,
    pub event_bus: EventBus,
    pub start_time: Instant,
    /// WAL sequence of the last snapshot written
    last_checkpoint_seq: u64,
}

/// Result of daemon startup: the daemon state plus the pieces the main
/// loop spawns or drives.
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
    /// Event reader for the engine loop
    pub event_reader: EventReader,
}

impl DaemonState {
    /// Process an event through the runtime.
    ///
    /// Result events are persisted to the WAL and will be processed by the
    /// engine loop on a later iteration, so every handler fires once per
    /// WAL entry.
    pub async fn process_event(&mut self, event: Event) -> Result<(), LifecycleError> {
        // Emitted events are also applied by the executor; apply_event is
        // idempotent so the second apply is harmless.
        self.state.lock().apply_event(&event);

        let result_events = self
            .runtime
            .handle_event(event)
            .await
            .map_err(|e| LifecycleError::Runtime(e.to_string()))?;

        for result_event in result_events {
            if let Err(e) = self.event_bus.send(result_event) {
                warn!("Failed to persist runtime result event to WAL: {}", e);
            }
        }
        Ok(())
    }

    /// Re-issue in-flight work recovered from disk. Called once after startup.
    pub async fn resume(&mut self) -> Result<(), LifecycleError> {
        let events = self
            .runtime
            .resume_pending()
            .await
            .map_err(|e| LifecycleError::Runtime(e.to_string()))?;
        for event in events {
            self.event_bus.send(event)?;
        }
        Ok(())
    }

    /// Move due timers onto the event bus.
    pub fn fire_timers(&self) {
        let now_ms = self.runtime.clock().epoch_ms();
        let fired = self.runtime.scheduler().lock().fired_timers(now_ms);
        for event in fired {
            if let Err(e) = self.event_bus.send(event) {
                warn!("Failed to persist fired timer: {}", e);
            }
        }
    }

    /// Snapshot state at the processed sequence and drop the WAL prefix it covers.
    pub async fn checkpoint(&mut self) -> Result<(), LifecycleError> {
        let seq = self.event_bus.wal.lock().processed_seq();
        if seq == 0 || seq == self.last_checkpoint_seq {
            return Ok(());
        }
        let state = self.state.lock().clone();
        let checkpointer = Checkpointer::new(self.config.snapshot_path.clone());
        let result = tokio::task::spawn_blocking(move || checkpointer.checkpoint_sync(seq, &state))
            .await
            .map_err(|e| LifecycleError::Runtime(e.to_string()))??;

        self.event_bus.wal.lock().truncate_before(seq + 1)?;
        self.last_checkpoint_seq = seq;
        info!(seq = result.seq, size_bytes = result.size_bytes, "checkpoint saved");
        Ok(())
    }

    /// Shutdown the daemon gracefully.
    ///
    /// In-flight activities are abandoned; their tasks are still pending in
    /// state and are dispatched again on the next startup.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        if let Err(e) = self.event_bus.wal.lock().flush() {
            warn!("Failed to flush WAL on shutdown: {}", e);
        }

        // Always snapshot, even with nothing processed.
        let processed_seq = self.event_bus.wal.lock().processed_seq();
        let state = self.state.lock().clone();
        let checkpointer = Checkpointer::new(self.config.snapshot_path.clone());
        match checkpointer.checkpoint_sync(processed_seq, &state) {
            Ok(result) => info!(
                seq = result.seq,
                size_bytes = result.size_bytes,
                "saved final shutdown snapshot"
            ),
            Err(e) => warn!("Failed to save shutdown snapshot: {}", e),
        }

        for path in [&self.config.socket_path, &self.config.lock_path, &self.config.version_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), "Failed to remove file: {}", e);
                }
            }
        }

        info!(uptime_secs = self.start_time.elapsed().as_secs(), "Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("WAL error: {0}")]
    Wal(#[from] vigil_storage::WalError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] vigil_storage::SnapshotError),

    #[error("Provider configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] JobControlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
