// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity bodies and the retry loop around them.
//!
//! Activities are the only code that talks to the provider. They run on
//! spawned tasks and may run more than once for the same scheduled task
//! (after a restart), which every job-control call tolerates.

use std::time::Duration;
use tokio::time::Instant;
use vigil_adapters::JobControl;
use vigil_core::{Activity, ActivityError, ActivityOutput, JobTarget, RetryPolicy};

/// Run `activity` against `target`, retrying transient failures per `retry`.
///
/// `container` picks the container whose logs are fetched; the provider
/// default applies when it is `None`.
///
/// A transient failure that outlives the policy escalates to
/// `RetriesExhausted`; without a policy it is returned as is.
pub async fn run<J: JobControl>(
    jobs: &J,
    activity: Activity,
    target: &JobTarget,
    container: Option<&str>,
    retry: Option<RetryPolicy>,
    settle: Duration,
) -> Result<ActivityOutput, ActivityError> {
    let first_attempt = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let err = match attempt(jobs, activity, target, container, settle).await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };

        let Some(policy) = retry.filter(|_| err.is_retryable()) else {
            return Err(err);
        };
        match policy.next_delay(attempts, first_attempt.elapsed()) {
            Some(delay) => {
                tracing::warn!(
                    %activity,
                    %target,
                    attempt = attempts,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %err,
                    "activity failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            None => return Err(err.exhausted(attempts)),
        }
    }
}

async fn attempt<J: JobControl>(
    jobs: &J,
    activity: Activity,
    target: &JobTarget,
    container: Option<&str>,
    settle: Duration,
) -> Result<ActivityOutput, ActivityError> {
    match activity {
        Activity::StartJob => {
            jobs.stop(target).await?;
            tokio::time::sleep(settle).await;
            tracing::info!(%target, "starting container");
            jobs.start(target).await?;
            Ok(ActivityOutput::Started)
        }
        Activity::GetStatus => {
            tracing::info!(%target, "checking status");
            Ok(ActivityOutput::Status(jobs.get_status(target).await?))
        }
        Activity::GetLogs => {
            tracing::info!(%target, container = container.unwrap_or("-"), "fetching logs");
            Ok(ActivityOutput::Logs(jobs.get_logs(target, container).await?))
        }
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
