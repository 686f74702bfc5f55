// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn vigil_no_args_shows_usage_and_fails() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn vigil_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("status")
        .stdout_has("cancel")
        .stdout_has("purge");
}

#[test]
fn vigil_start_help_names_env_fallbacks() {
    cli()
        .args(&["start", "--help"])
        .passes()
        .stdout_has("--resource-group")
        .stdout_has("ResourceGroup")
        .stdout_has("--container-policy");
}

#[test]
fn vigil_daemon_help_shows_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn vigil_version_matches_package() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn poll_secs_requires_wait() {
    cli().args(&["status", "sup-x", "--poll-secs", "1"]).fails().stderr_has("--wait");
}
