// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vigild entry point: recover, serve, and run the engine loop.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use vigil_core::Event;
use vigil_daemon::env::{checkpoint_interval, timer_check};
use vigil_daemon::lifecycle::{self, Config, LifecycleError, StartupResult};
use vigil_daemon::listener::{ListenCtx, Listener};
use vigil_daemon::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("vigild: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::write_startup_marker(&config.log_path) {
        eprintln!("vigild: failed to write {}: {e}", config.log_path.display());
    }
    let _log_guard = match logging::init(&config.log_path) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("vigild: failed to open log {}: {e}", config.log_path.display());
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}{e}", logging::STARTUP_ERROR);
            eprintln!("vigild: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), LifecycleError> {
    let StartupResult { mut daemon, listener, event_reader } = lifecycle::startup(&config).await?;

    let shutdown = CancellationToken::new();
    let ctx = Arc::new(ListenCtx {
        event_bus: daemon.event_bus.clone(),
        state: Arc::clone(&daemon.state),
        shutdown: shutdown.clone(),
    });
    tokio::spawn(Listener::new(listener, ctx).run());

    // The CLI waits for this line before talking to the socket.
    println!("READY");

    daemon.resume().await?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut timer_tick = tokio::time::interval(timer_check());
    let mut checkpoint_tick = tokio::time::interval(checkpoint_interval());
    checkpoint_tick.tick().await;

    loop {
        tokio::select! {
            entry = event_reader.recv() => match entry {
                Ok(entry) if matches!(entry.event, Event::Shutdown) => break,
                Ok(entry) => {
                    if let Err(e) = daemon.process_event(entry.event).await {
                        error!(seq = entry.seq, "failed to process event: {e}");
                    }
                }
                Err(e) => {
                    error!("failed to read WAL: {e}");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
            _ = timer_tick.tick() => daemon.fire_timers(),
            _ = checkpoint_tick.tick() => {
                if let Err(e) = daemon.checkpoint().await {
                    warn!("checkpoint failed: {e}");
                }
            }
            _ = shutdown.cancelled() => {
                info!("shutdown requested");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received SIGINT");
                break;
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM");
                break;
            }
        }
    }

    shutdown.cancel();
    daemon.shutdown()
}
