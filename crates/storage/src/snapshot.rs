// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time copies of every supervision.
//!
//! A snapshot is tagged with the last WAL sequence folded into it; the daemon
//! restores it and replays only the WAL entries written afterwards.

use crate::migration::MigrationError;
use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current snapshot schema version
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version for migrations
    #[serde(rename = "v")]
    pub version: u32,
    /// Last WAL sequence folded into `state`
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at: Utc::now() }
    }

    /// Supervisions still being watched at the time of the snapshot.
    pub fn running_roots(&self) -> usize {
        self.state.roots().iter().filter(|r| !r.is_terminal()).count()
    }
}

const MAX_BAK_FILES: u32 = 3;

fn bak_path(path: &Path, n: u32) -> PathBuf {
    match n {
        1 => path.with_extension("bak"),
        n => path.with_extension(format!("bak.{n}")),
    }
}

/// Free up `.bak` next to `path` by shifting older copies to `.bak.2`,
/// `.bak.3`; the copy beyond [`MAX_BAK_FILES`] is dropped.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let _ = fs::remove_file(bak_path(path, MAX_BAK_FILES));
    for n in (1..MAX_BAK_FILES).rev() {
        let from = bak_path(path, n);
        if from.exists() {
            let _ = fs::rename(&from, bak_path(path, n + 1));
        }
    }
    bak_path(path, 1)
}
