// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle specs

use crate::prelude::*;

#[test]
fn daemon_start_status_stop() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "start"]).passes().stdout_has("Daemon started");
    temp.vigil()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Supervisions: 0 (0 running)");
    temp.vigil().args(&["daemon", "stop"]).passes().stdout_has("Daemon stopped");
    temp.vigil().args(&["daemon", "status"]).passes().stdout_has("Daemon not running");
}

#[test]
fn daemon_start_twice_reports_already_running() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "start"]).passes();
    temp.vigil().args(&["daemon", "start"]).passes().stdout_has("already running");
}

#[test]
fn daemon_stop_when_not_running() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "stop"]).passes().stdout_has("Daemon not running");
}

#[test]
fn daemon_writes_state_files_and_removes_them_on_stop() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "start"]).passes();
    let state = temp.state_dir();
    for file in ["daemon.sock", "daemon.pid", "daemon.version"] {
        assert!(state.join(file).exists(), "{file} missing");
    }
    assert!(temp.daemon_log().contains("--- vigild: starting"));

    temp.vigil().args(&["daemon", "stop"]).passes();
    let gone = wait_for(SPEC_WAIT_MAX_MS, || {
        !state.join("daemon.sock").exists() && !state.join("daemon.pid").exists()
    });
    assert!(gone, "state files should be removed on shutdown");
    assert!(state.join("snapshot.json").exists(), "shutdown writes a final snapshot");
}

#[test]
fn daemon_status_json() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "start"]).passes();
    let out = temp.vigil().args(&["-o", "json", "daemon", "status"]).passes();
    let json: serde_json::Value = serde_json::from_str(&out.stdout()).unwrap();
    similar_asserts::assert_eq!(json["status"].as_str(), Some("running"));
    assert_eq!(json["supervisions"], 0);
}

#[test]
fn bad_provider_script_surfaces_startup_error() {
    let temp = Project::empty();
    std::fs::write(temp.path().join("fake-jobs.json"), "not json").unwrap();
    temp.vigil().args(&["daemon", "start"]).fails().stderr_has("failed to start daemon");
}
