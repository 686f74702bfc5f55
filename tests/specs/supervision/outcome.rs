// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! How a supervised job's end is judged, seen through `vigil status`.

use crate::prelude::*;

const JOBS: &str = r#"{
    "rg-spec/ok": {
        "statuses": [{ "state": "Terminated" }],
        "logs": "processed 12 files\nEXIT_CODE_SUCCESS\n"
    },
    "rg-spec/broken": {
        "statuses": [{ "state": "Terminated" }],
        "logs": "Traceback: disk full\n"
    },
    "rg-spec/multi": {
        "statuses": [{ "containers": ["Terminated", "Running"] }],
        "logs": "EXIT_CODE_SUCCESS"
    }
}"#;

fn project() -> Project {
    let temp = Project::empty();
    temp.jobs(JOBS);
    temp
}

#[test]
fn success_marker_in_logs_completes() {
    let temp = project();
    let id = temp.start("ok", &[]);

    temp.vigil()
        .args(&["status", &id, "--wait", "--poll-secs", "1"])
        .passes()
        .stdout_has("Completed")
        .stdout_has("rg-spec/ok");

    let status = temp.status_of(&id);
    assert_eq!(status["outcome"]["outcome"], "success");
    assert_eq!(status["last_state"], "Terminated");
}

#[test]
fn logs_without_marker_fail_with_exit_code_one() {
    let temp = project();
    let id = temp.start("broken", &[]);

    temp.vigil()
        .args(&["status", &id, "--wait", "--poll-secs", "1"])
        .exits(1)
        .stdout_has("Failed(logs: Traceback: disk full)");
}

#[test]
fn unknown_job_fails_as_not_found() {
    let temp = project();
    let id = temp.start("nope", &[]);
    assert!(temp.wait_status(&id, "failed"));

    temp.vigil()
        .args(&["status", &id])
        .passes()
        .stdout_has("Failed(")
        .stdout_has("target_not_found");
}

#[test]
fn container_policy_all_waits_for_every_container() {
    let temp = project();
    let id = temp.start("multi", &["--container-policy", "all"]);
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.status_of(&id)["polls"].as_u64() >= Some(1)));

    let status = temp.status_of(&id);
    assert_eq!(status["status"], "running", "second container still running");
}

#[test]
fn container_policy_first_follows_lead_container() {
    let temp = project();
    let id = temp.start("multi", &["--container-policy", "first"]);
    assert!(temp.wait_status(&id, "completed"));
}

#[test]
fn status_json_reports_policy_and_progress() {
    let temp = project();
    let id = temp.start("ok", &[]);
    assert!(temp.wait_status(&id, "completed"));

    let status = temp.status_of(&id);
    assert_eq!(status["id"], id.as_str());
    assert_eq!(status["polling_interval_minutes"], 1);
    assert_eq!(status["max_processing_time_minutes"], 30);
    assert!(status["deadline_ms"].as_u64().is_some());
    assert!(status["finished_at_ms"].as_u64().is_some());
}

#[test]
fn status_accepts_id_without_type_prefix() {
    let temp = project();
    let id = temp.start("ok", &[]);
    let short = id.strip_prefix("sup-").unwrap();
    temp.vigil().args(&["status", short]).passes().stdout_has(&id);
}
