// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil cancel` specs

use crate::prelude::*;

const LONG_RUNNING: &str = r#"{ "rg-spec/long": { "statuses": [{ "state": "Running" }] } }"#;

#[test]
fn cancel_stops_supervision() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let id = temp.start("long", &[]);

    temp.vigil().args(&["cancel", &id]).passes().stdout_has("Cancelled supervision");
    assert!(temp.wait_status(&id, "cancelled"));
    temp.vigil().args(&["status", &id]).passes().stdout_has("Cancelled");
}

#[test]
fn status_wait_on_cancelled_exits_three() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let id = temp.start("long", &[]);
    temp.vigil().args(&["cancel", &id]).passes();

    temp.vigil().args(&["status", &id, "--wait", "--poll-secs", "1"]).exits(3);
}

#[test]
fn cancel_twice_is_rejected() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let id = temp.start("long", &[]);
    temp.vigil().args(&["cancel", &id]).passes();
    assert!(temp.wait_status(&id, "cancelled"));

    temp.vigil().args(&["cancel", &id]).fails().stderr_has("already cancelled");
}

#[test]
fn cancel_unknown_supervision_fails() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "start"]).passes();
    temp.vigil().args(&["cancel", "sup-nothing"]).fails().stderr_has("supervision not found");
}
