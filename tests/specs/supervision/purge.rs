// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil list` and `vigil purge` specs

use crate::prelude::*;

const LONG_RUNNING: &str = r#"{ "rg-spec/long": { "statuses": [{ "state": "Running" }] } }"#;

fn listed_ids(temp: &Project) -> Vec<String> {
    let out = temp.vigil().args(&["-o", "json", "list"]).passes();
    let json: serde_json::Value = serde_json::from_str(&out.stdout()).unwrap();
    json.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn list_shows_newest_first() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let first = temp.start("long", &[]);
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = temp.start("long", &[]);

    similar_asserts::assert_eq!(listed_ids(&temp), vec![second, first]);
    temp.vigil().args(&["list"]).passes().stdout_has("TARGET").stdout_has("rg-spec/long");
}

#[test]
fn list_with_nothing_supervised() {
    let temp = Project::empty();
    temp.vigil().args(&["daemon", "start"]).passes();
    temp.vigil().args(&["list"]).passes().stdout_has("No supervisions");
}

#[test]
fn purge_removes_finished_and_keeps_running() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let running = temp.start("long", &[]);
    let failed = temp.start("missing", &[]);
    assert!(temp.wait_status(&failed, "failed"));

    temp.vigil().args(&["purge"]).passes().stdout_has(&format!("Purged {failed}"));

    similar_asserts::assert_eq!(listed_ids(&temp), vec![running]);
    temp.vigil().args(&["list"]).passes().stdout_lacks(&failed);
}

#[test]
fn purge_running_supervision_is_rejected() {
    let temp = Project::empty();
    temp.jobs(LONG_RUNNING);
    let id = temp.start("long", &[]);

    temp.vigil().args(&["purge", &id]).fails().stderr_has("still running");
    temp.vigil().args(&["cancel", &id]).passes();
    assert!(temp.wait_status(&id, "cancelled"));
    temp.vigil().args(&["purge", &id]).passes().stdout_has("1 supervision(s) purged");
}
