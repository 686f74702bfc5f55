// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[yare::parameterized(
    first_failure_retries      = { 1, 0,  Some(30) },
    second_failure_past_budget = { 2, 30, None },
    attempts_exhausted         = { 3, 0,  None },
    just_inside_timeout        = { 1, 29, Some(30) },
)]
fn status_check_policy(attempts: u32, elapsed_secs: u64, expected: Option<u64>) {
    let policy = RetryPolicy::status_check();
    assert_eq!(policy.next_delay(attempts, secs(elapsed_secs)), expected.map(secs));
}

#[test]
fn generous_timeout_allows_all_attempts() {
    let policy = RetryPolicy::new(secs(1), 3, secs(60));
    assert_eq!(policy.next_delay(1, secs(0)), Some(secs(1)));
    assert_eq!(policy.next_delay(2, secs(1)), Some(secs(1)));
    assert_eq!(policy.next_delay(3, secs(2)), None);
}

#[test]
fn zero_interval_never_retries() {
    let policy = RetryPolicy::new(Duration::ZERO, 5, secs(60));
    assert_eq!(policy.next_delay(1, Duration::ZERO), None);
}

#[test]
fn serializes_durations_as_millis() {
    let json = serde_json::to_value(RetryPolicy::status_check()).unwrap();
    assert_eq!(json["first_interval"], 30_000);
    assert_eq!(json["retry_timeout"], 30_000);
    assert_eq!(json["max_attempts"], 3);
}
