// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn task_timer_format() {
    let id = TimerId::task(&InstanceId::from_string("sup-abc-1"), 3, 1);
    assert_eq!(id.as_str(), "task:sup-abc-1:3:1");
}

#[test]
fn task_timer_parses_back() {
    let instance = InstanceId::from_string("sup-abc-1");
    let id = TimerId::task(&instance, 12, 0);
    assert_eq!(id.kind(), Some(TimerKind::Task { instance: instance.clone(), generation: 12, seq: 0 }));
    assert_eq!(id.instance_id(), Some(instance));
}

#[yare::parameterized(
    no_prefix      = { "sup-abc:1:2" },
    missing_seq    = { "task:sup-abc:1" },
    bad_generation = { "task:sup-abc:x:2" },
    bad_seq        = { "task:sup-abc:1:y" },
    empty_instance = { "task::1:2" },
    random         = { "tmr-V1StGXR8Z5jdHi6BmyT" },
)]
fn unrecognized_formats(id: &str) {
    assert_eq!(TimerKind::parse(id), None);
}

#[test]
fn timer_id_serde() {
    let id = TimerId::from_string("task:sup-1:0:1");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"task:sup-1:0:1\"");
    let parsed: TimerId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}
