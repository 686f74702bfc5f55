// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writing and loading compressed snapshots.
//!
//! A checkpoint is written to a temp file, fsynced, and renamed into place;
//! the previous snapshot is rotated to `.bak` first. Files are zstd
//! compressed; plain JSON is still accepted on load.

use crate::migration::MigrationRegistry;
use crate::snapshot::{rotate_bak_path, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
use crate::state::MaterializedState;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

const ZSTD_LEVEL: i32 = 3;
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointResult {
    pub seq: u64,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `state` as of WAL sequence `seq`. Blocking; call off the engine loop.
    pub fn checkpoint_sync(
        &self,
        seq: u64,
        state: &MaterializedState,
    ) -> Result<CheckpointResult, SnapshotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(&Snapshot::new(seq, state.clone()))?;
        let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }
        if self.path.exists() {
            fs::rename(&self.path, rotate_bak_path(&self.path))?;
        }
        fs::rename(&tmp, &self.path)?;

        Ok(CheckpointResult { seq, size_bytes: compressed.len() as u64 })
    }
}

/// Load the snapshot at `path`, migrating it to the current schema.
///
/// Returns `Ok(None)` when there is no snapshot. An unreadable snapshot is
/// rotated to `.bak` and also reported as `None` so recovery falls back to
/// the WAL; a snapshot from a newer schema is an error.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;

    let decoded = if bytes.starts_with(&ZSTD_MAGIC) {
        match zstd::decode_all(bytes.as_slice()) {
            Ok(decoded) => decoded,
            Err(e) => return discard_corrupt(path, &e.to_string()),
        }
    } else {
        bytes
    };

    let value: serde_json::Value = match serde_json::from_slice(&decoded) {
        Ok(value) => value,
        Err(e) => return discard_corrupt(path, &e.to_string()),
    };
    let migrated = MigrationRegistry::new().migrate_to(value, CURRENT_SNAPSHOT_VERSION)?;
    match serde_json::from_value::<Snapshot>(migrated) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => discard_corrupt(path, &e.to_string()),
    }
}

fn discard_corrupt(path: &Path, reason: &str) -> Result<Option<Snapshot>, SnapshotError> {
    let bak = rotate_bak_path(path);
    warn!(path = %path.display(), bak = %bak.display(), reason, "discarding unreadable snapshot");
    fs::rename(path, &bak)?;
    Ok(None)
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
