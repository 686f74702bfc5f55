// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil start` validation and output specs

use crate::prelude::*;

#[test]
fn start_prints_id_and_status_hint() {
    let temp = Project::empty();
    let out = temp
        .vigil()
        .args(&["start", "--resource-group", "rg-spec", "--group", "nightly", "--interval", "1", "--max", "5"])
        .passes();
    out.stdout_has("Started supervision sup-")
        .stdout_has("rg-spec/nightly")
        .stdout_has("vigil status sup-");
}

#[test]
fn start_reads_request_from_environment() {
    let temp = Project::empty();
    temp.vigil()
        .env("ResourceGroup", "rg-env")
        .env("ACIGroup", "from-env")
        .env("PollingIntervalInMinutes", "1")
        .env("MaxProcessingTimeInMinutes", "5")
        .args(&["start"])
        .passes()
        .stdout_has("rg-env/from-env");
}

#[test]
fn start_without_target_fails_before_contacting_daemon() {
    let temp = Project::empty();
    temp.vigil()
        .args(&["start", "--interval", "1", "--max", "5"])
        .fails()
        .stderr_has("ResourceGroup");
    assert!(!temp.state_dir().join("daemon.sock").exists());
}

#[test]
fn start_rejects_zero_interval() {
    let temp = Project::empty();
    temp.vigil()
        .args(&["start", "--resource-group", "rg", "--group", "g", "--interval", "0", "--max", "5"])
        .fails();
}

#[test]
fn start_warns_when_interval_exceeds_max() {
    let temp = Project::empty();
    temp.vigil()
        .args(&["start", "--resource-group", "rg", "--group", "g", "--interval", "10", "--max", "5"])
        .passes()
        .stderr_has("exceeds max processing time")
        .stderr_has("checked only at start and at the deadline");
}

#[test]
fn unknown_supervision_is_an_error() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "start"]).passes();
    temp.vigil().args(&["status", "sup-missing"]).fails().stderr_has("not found");
}
