// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

fn function_app_settings() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ResourceGroup", "rg-batch"),
        ("ACIGroup", "nightly-import"),
        ("PollingIntervalInMinutes", "5"),
        ("MaxProcessingTimeInMinutes", "120"),
    ]
}

#[test]
fn reads_original_setting_names() {
    let request = RequestConfig::from_lookup(lookup(&function_app_settings()))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(request.target, JobTarget::new("rg-batch", "nightly-import"));
    assert_eq!(request.policy.polling_interval_minutes, 5);
    assert_eq!(request.policy.max_processing_time_minutes, 120);
    assert_eq!(request.tuning, SupervisionTuning::default());
}

#[test]
fn vigil_aliases_take_precedence() {
    let mut vars = function_app_settings();
    vars.push(("VIGIL_JOB_GROUP", "other"));
    let config = RequestConfig::from_lookup(lookup(&vars)).unwrap();
    assert_eq!(config.job_group.as_deref(), Some("other"));
}

#[test]
fn flags_override_environment() {
    let env = RequestConfig::from_lookup(lookup(&function_app_settings())).unwrap();
    let flags = RequestConfig {
        polling_interval_minutes: Some(1),
        container_policy: Some(ContainerPolicy::AllTerminated),
        ..RequestConfig::default()
    };
    let request = env.overridden_by(flags).build().unwrap();
    assert_eq!(request.policy.polling_interval_minutes, 1);
    assert_eq!(request.policy.max_processing_time_minutes, 120);
    assert_eq!(request.tuning.container_policy, ContainerPolicy::AllTerminated);
}

#[yare::parameterized(
    negative = { "-1" },
    words    = { "five" },
    decimal  = { "2.5" },
)]
fn rejects_non_numeric_minutes(value: &str) {
    let err = RequestConfig::from_lookup(lookup(&[("PollingIntervalInMinutes", value)])).unwrap_err();
    assert_eq!(
        err,
        RequestConfigError::InvalidNumber {
            name: "PollingIntervalInMinutes",
            value: value.to_string()
        }
    );
}

#[test]
fn missing_target_names_the_setting() {
    let err = RequestConfig::default().build().unwrap_err();
    assert!(err.to_string().contains("ResourceGroup"), "{err}");
}

#[test]
fn zero_interval_is_rejected() {
    let mut vars = function_app_settings();
    vars[2] = ("PollingIntervalInMinutes", "0");
    let err = RequestConfig::from_lookup(lookup(&vars)).unwrap().build().unwrap_err();
    assert_eq!(err, RequestConfigError::Policy(PolicyError::ZeroInterval));
}

#[test]
fn blank_values_count_as_unset() {
    let config = RequestConfig::from_lookup(lookup(&[("ResourceGroup", "  ")])).unwrap();
    assert_eq!(config.resource_group, None);
}

#[test]
fn bad_container_policy_is_reported() {
    let err = RequestConfig::from_lookup(lookup(&[("VIGIL_CONTAINER_POLICY", "most")])).unwrap_err();
    assert!(matches!(err, RequestConfigError::ContainerPolicy(_)));
}
