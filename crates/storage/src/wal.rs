// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of events.
//!
//! One JSON object per line: `{"seq": N, "event": {...}}`. Appends are
//! buffered and written on [`Wal::flush`] (group commit). The engine loop
//! consumes entries in order with [`Wal::next_unprocessed`] and records
//! progress with [`Wal::mark_processed`]; the processed sequence is what a
//! snapshot captures.

use crate::snapshot::rotate_bak_path;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;
use vigil_core::Event;

/// Buffered entries that force a flush
const FLUSH_THRESHOLD: usize = 100;

/// Maximum time an entry may sit in the buffer
const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

pub struct Wal {
    path: PathBuf,
    file: File,
    buffer: Vec<WalEntry>,
    write_seq: u64,
    processed_seq: u64,
    /// Byte offset of the next line `next_unprocessed` will read
    read_offset: u64,
    last_flush: Instant,
}

impl Wal {
    /// Open (or create) the log at `path`.
    ///
    /// A file with unreadable lines is rotated to `.bak` and rewritten with
    /// the valid prefix, so a torn write at the tail never blocks startup.
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut last_seq = 0;
        if path.exists() {
            let bytes = fs::read(path)?;
            let (valid, corrupt) = parse_valid_prefix(&bytes);
            if let Some(last) = valid.last() {
                last_seq = last.seq;
            }
            if corrupt {
                let bak = rotate_bak_path(path);
                warn!(
                    path = %path.display(),
                    bak = %bak.display(),
                    valid = valid.len(),
                    "WAL contains corrupt entries, rotating and keeping valid prefix"
                );
                fs::rename(path, &bak)?;
                write_entries(path, &valid)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            buffer: Vec::new(),
            write_seq: last_seq.max(processed_seq),
            processed_seq,
            read_offset: 0,
            last_flush: Instant::now(),
        })
    }

    /// Buffer an event and return its sequence number.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        self.buffer.push(WalEntry { seq: self.write_seq, event: event.clone() });
        Ok(self.write_seq)
    }

    /// Write buffered entries to disk and fsync.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.buffer.is_empty() {
            self.last_flush = Instant::now();
            return Ok(());
        }
        let mut out = Vec::new();
        for entry in &self.buffer {
            serde_json::to_writer(&mut out, entry)?;
            out.push(b'\n');
        }
        self.file.write_all(&out)?;
        self.file.sync_data()?;
        self.buffer.clear();
        self.last_flush = Instant::now();
        Ok(())
    }

    pub fn needs_flush(&self) -> bool {
        self.buffer.len() >= FLUSH_THRESHOLD
            || (!self.buffer.is_empty() && self.last_flush.elapsed() >= FLUSH_INTERVAL)
    }

    /// Next entry after the processed sequence, or `None` when caught up.
    ///
    /// A corrupt line is skipped (logged) and reported as `None` so the
    /// caller simply polls again.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        if !self.buffer.is_empty() {
            self.flush()?;
        }

        let mut reader = BufReader::new(File::open(&self.path)?);
        reader.seek(SeekFrom::Start(self.read_offset))?;

        loop {
            let mut line = Vec::new();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 || line.last() != Some(&b'\n') {
                // EOF or a partially written line
                return Ok(None);
            }
            self.read_offset += read as u64;

            let trimmed = trim_newline(&line);
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_slice::<WalEntry>(trimmed) {
                Ok(entry) if entry.seq <= self.processed_seq => continue,
                Ok(entry) => return Ok(Some(entry)),
                Err(e) => {
                    warn!(offset = self.read_offset, error = %e, "skipping corrupt WAL entry");
                    return Ok(None);
                }
            }
        }
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = seq;
    }

    /// All flushed entries with `seq > after`, stopping at the first corrupt line.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let bytes = fs::read(&self.path)?;
        let (valid, _) = parse_valid_prefix(&bytes);
        Ok(valid.into_iter().filter(|e| e.seq > after).collect())
    }

    /// Drop entries with `seq < before`. Used after a checkpoint.
    pub fn truncate_before(&mut self, before: u64) -> Result<(), WalError> {
        self.flush()?;
        let keep: Vec<WalEntry> =
            self.entries_after(0)?.into_iter().filter(|e| e.seq >= before).collect();
        write_entries(&self.path, &keep)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.read_offset = 0;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }
}

fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse entries up to the first unreadable line. Returns whether one was hit.
fn parse_valid_prefix(bytes: &[u8]) -> (Vec<WalEntry>, bool) {
    let mut entries = Vec::new();
    for line in bytes.split(|b| *b == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<WalEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(_) => return (entries, true),
        }
    }
    (entries, false)
}

/// Atomically replace the file at `path` with `entries`.
fn write_entries(path: &Path, entries: &[WalEntry]) -> Result<(), WalError> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        for entry in entries {
            serde_json::to_writer(&mut file, entry)?;
            file.write_all(b"\n")?;
        }
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
