// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigil-core: value types shared by the vigil supervision host

pub mod macros;

pub mod clock;
mod duration_serde;
pub mod effect;
pub mod event;
pub mod id;
pub mod orchestration;
pub mod outcome;
pub mod retry;
pub mod status;
pub mod target;
pub mod time_fmt;
pub mod timer;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::Effect;
pub use event::Event;
pub use id::InstanceId;
pub use orchestration::{
    Activity, ActivityError, ActivityErrorKind, ActivityOutput, InstanceKind, InstanceStatus,
    OrchestrationInput, ParentLink, PollCycleState, Task, TaskRecord, TaskResult,
};
pub use outcome::{classify, Fault, FaultKind, Outcome, SUCCESS_MARKER};
pub use retry::RetryPolicy;
#[cfg(any(test, feature = "test-support"))]
pub use status::JobStatusSnapshotBuilder;
pub use status::{ContainerStatus, JobStatusSnapshot, TERMINATED};
pub use target::{
    ContainerPolicy, JobTarget, PolicyError, SupervisionPolicy, SupervisionRequest,
    SupervisionTuning,
};
pub use time_fmt::{elapsed_minutes, format_elapsed, format_elapsed_ms};
pub use timer::{TimerId, TimerKind};
