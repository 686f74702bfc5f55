// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn captures_output() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo hello"]);
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo").await.unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn missing_binary_is_an_error() {
    let cmd = Command::new("vigil-definitely-not-a-binary");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "missing-tool").await.unwrap_err();
    assert!(err.starts_with("missing-tool failed to run"), "{err}");
}

#[tokio::test]
async fn slow_command_times_out() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(50), "sleep").await.unwrap_err();
    assert!(err.contains("timed out"), "{err}");
}

#[tokio::test]
async fn failure_detail_prefers_stderr() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo boom >&2; exit 3"]);
    let output = run_with_timeout(cmd, Duration::from_secs(5), "fail").await.unwrap();
    assert_eq!(failure_detail(&output), "boom");

    let mut cmd = Command::new("sh");
    cmd.args(["-c", "exit 4"]);
    let output = run_with_timeout(cmd, Duration::from_secs(5), "fail").await.unwrap();
    assert!(failure_detail(&output).contains('4'));
}
