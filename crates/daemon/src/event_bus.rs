// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed event bus.
//!
//! Producers (listener, activity forwarder, timer tick) append to the WAL
//! through [`EventBus`]; the engine loop consumes entries in order through
//! [`EventReader`]. An event is durable before the engine acts on it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use vigil_core::Event;
use vigil_storage::{Wal, WalEntry, WalError};

#[derive(Clone)]
pub struct EventBus {
    pub wal: Arc<Mutex<Wal>>,
    wake: Arc<Notify>,
}

pub struct EventReader {
    pub wal: Arc<Mutex<Wal>>,
    wake: Arc<Notify>,
}

impl EventBus {
    pub fn new(wal: Wal) -> (EventBus, EventReader) {
        let wal = Arc::new(Mutex::new(wal));
        let wake = Arc::new(Notify::new());
        let bus = EventBus { wal: Arc::clone(&wal), wake: Arc::clone(&wake) };
        (bus, EventReader { wal, wake })
    }

    /// Append an event and wake the reader. Returns the WAL sequence.
    pub fn send(&self, event: Event) -> Result<u64, WalError> {
        let seq = self.wal.lock().append(&event)?;
        self.wake.notify_one();
        Ok(seq)
    }
}

impl EventReader {
    /// Wait for the next unprocessed entry.
    ///
    /// The entry is marked processed when returned; the caller applies it
    /// before the next checkpoint reads the processed sequence.
    pub async fn recv(&self) -> Result<WalEntry, WalError> {
        loop {
            // Register interest before checking so a send in between is not lost
            let notified = self.wake.notified();
            {
                let mut wal = self.wal.lock();
                if let Some(entry) = wal.next_unprocessed()? {
                    wal.mark_processed(entry.seq);
                    return Ok(entry);
                }
            }
            notified.await;
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
