// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisions survive daemon restarts and crashes.

use crate::prelude::*;

const LONG_RUNNING: &str = r#"{ "rg-spec/long": { "statuses": [{ "state": "Running" }] } }"#;

#[test]
fn running_supervision_survives_graceful_restart() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let id = temp.start("long", &[]);
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.status_of(&id)["polls"].as_u64() >= Some(1)));

    temp.vigil().args(&["daemon", "stop"]).passes();
    temp.vigil().args(&["daemon", "start"]).passes();

    let status = temp.status_of(&id);
    assert_eq!(status["status"], "running");
    assert_eq!(status["last_state"], "Running");
    assert!(temp.daemon_log().matches("--- vigild: starting").count() >= 2);
}

#[test]
fn running_supervision_survives_crash() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let id = temp.start("long", &[]);
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.status_of(&id)["polls"].as_u64() >= Some(1)));

    assert!(temp.daemon_kill(), "should be able to kill daemon");
    temp.vigil().args(&["daemon", "start"]).passes();

    let status = temp.status_of(&id);
    assert_eq!(status["status"], "running");
    assert_eq!(status["target"], "rg-spec/long");

    // Still cancellable after recovery
    temp.vigil().args(&["cancel", &id]).passes();
    assert!(temp.wait_status(&id, "cancelled"));
}

#[test]
fn finished_supervision_keeps_its_outcome_after_restart() {
    let temp = Project::empty();
    let id = temp.start("missing", &[]);
    assert!(temp.wait_status(&id, "failed"));

    temp.vigil().args(&["daemon", "stop"]).passes();
    temp.vigil().args(&["daemon", "start"]).passes();

    let status = temp.status_of(&id);
    assert_eq!(status["status"], "failed");
    assert_eq!(status["fault"]["kind"], "target_not_found");
}
