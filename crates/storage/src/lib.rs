// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigil-storage: write-ahead log, snapshots, and materialized state

mod checkpoint;
mod migration;
mod snapshot;
mod state;
mod wal;

pub use checkpoint::{load_snapshot, CheckpointResult, Checkpointer};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{InstanceRecord, MaterializedState, PendingTask, PollObservation};
pub use wal::{Wal, WalEntry, WalError};
