// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use vigil_core::InstanceId;

fn open(dir: &tempfile::TempDir) -> (EventBus, EventReader) {
    EventBus::new(Wal::open(&dir.path().join("events.wal"), 0).unwrap())
}

fn purged(id: &str) -> Event {
    Event::InstancePurged { id: InstanceId::from_string(id) }
}

#[tokio::test]
async fn events_are_read_in_send_order() {
    let dir = tempfile::tempdir().unwrap();
    let (bus, reader) = open(&dir);

    bus.send(purged("sup-a")).unwrap();
    bus.send(purged("sup-b")).unwrap();

    assert_eq!(reader.recv().await.unwrap().event, purged("sup-a"));
    let second = reader.recv().await.unwrap();
    assert_eq!(second.event, purged("sup-b"));
    assert_eq!(reader.wal.lock().processed_seq(), second.seq);
}

#[tokio::test]
async fn recv_waits_for_a_send() {
    let dir = tempfile::tempdir().unwrap();
    let (bus, reader) = open(&dir);

    let pending = tokio::time::timeout(Duration::from_millis(20), reader.recv()).await;
    assert!(pending.is_err(), "nothing sent yet");

    let sender = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        bus.send(Event::Shutdown).unwrap();
    });
    let entry = tokio::time::timeout(Duration::from_secs(2), reader.recv()).await.unwrap().unwrap();
    assert_eq!(entry.event, Event::Shutdown);
    sender.await.unwrap();
}

#[tokio::test]
async fn sent_events_are_durable_after_flush() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");
    let (bus, _reader) = EventBus::new(Wal::open(&path, 0).unwrap());

    bus.send(purged("sup-a")).unwrap();
    bus.wal.lock().flush().unwrap();

    let reopened = Wal::open(&path, 0).unwrap();
    let entries = reopened.entries_after(0).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event, purged("sup-a"));
}
