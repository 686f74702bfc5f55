// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigil-engine: deterministic orchestrations and the runtime that drives them

pub mod activity;
mod error;
mod executor;
pub mod orchestration;
mod runtime;
mod scheduler;

pub use error::RuntimeError;
pub use executor::{ExecuteError, Executor};
pub use orchestration::{decide, DecisionContext, Step};
pub use runtime::{Runtime, RuntimeDeps};
pub use scheduler::Scheduler;
