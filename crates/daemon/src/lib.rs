// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigild: the supervision daemon.
//!
//! Owns the write-ahead log, the materialized state and the runtime, and
//! serves the CLI over a Unix socket.

pub mod env;
pub mod event_bus;
pub mod lifecycle;
pub mod listener;
pub mod logging;

pub use lifecycle::{Config, DaemonState, LifecycleError, StartupResult};
