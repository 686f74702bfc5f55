// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the workspace specs.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use tempfile::TempDir;

/// Upper bound for any single wait in a spec.
///
/// Covers the provider settle delay before the first status check.
pub const SPEC_WAIT_MAX_MS: u64 = 20_000;

const SPEC_POLL_MS: u64 = 100;

/// Poll `check` until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(SPEC_POLL_MS));
    }
    check()
}

/// `vigil` with no project environment, for help and version output.
pub fn cli() -> CliBuilder {
    CliBuilder::new().env("NO_COLOR", "1")
}

/// An isolated state directory plus a fake provider script.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// A project whose provider knows no jobs.
    pub fn empty() -> Self {
        let project = Self { dir: TempDir::new().unwrap() };
        project.jobs("{}");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    fn script_path(&self) -> PathBuf {
        self.dir.path().join("fake-jobs.json")
    }

    /// Replace the fake provider's jobs, keyed by `scope/name`.
    ///
    /// The daemon reads the script at startup, so call this before the first
    /// command that talks to it.
    pub fn jobs(&self, jobs_json: &str) {
        let script = format!(r#"{{"jobs": {jobs_json}}}"#);
        std::fs::write(self.script_path(), script).unwrap();
    }

    /// `vigil` wired to this project's daemon.
    pub fn vigil(&self) -> CliBuilder {
        cli()
            .env("VIGIL_STATE_DIR", self.state_dir())
            .env("VIGIL_PROVIDER", "fake")
            .env("VIGIL_FAKE_SCRIPT", self.script_path())
            .env("VIGIL_DAEMON_BINARY", cargo_bin("vigild"))
            .env("VIGIL_TIMER_CHECK_MS", "100")
            .env("RUST_LOG", "info")
    }

    /// Start a supervision of `rg-spec/<group>` and return its id.
    pub fn start(&self, group: &str, extra: &[&str]) -> String {
        let mut args = vec![
            "-o",
            "json",
            "start",
            "--resource-group",
            "rg-spec",
            "--group",
            group,
            "--interval",
            "1",
            "--max",
            "30",
        ];
        args.extend_from_slice(extra);
        let out = self.vigil().args(&args).passes();
        let json: serde_json::Value = serde_json::from_str(&out.stdout()).unwrap();
        json["id"].as_str().unwrap().to_string()
    }

    /// Current status of a supervision as reported by `status -o json`.
    pub fn status_of(&self, id: &str) -> serde_json::Value {
        let out = self.vigil().args(&["-o", "json", "status", id]).passes();
        serde_json::from_str(&out.stdout()).unwrap()
    }

    /// Wait until the supervision reaches `status` (snake_case).
    pub fn wait_status(&self, id: &str, status: &str) -> bool {
        let reached = wait_for(SPEC_WAIT_MAX_MS, || self.status_of(id)["status"] == status);
        if !reached {
            eprintln!("=== DAEMON LOG ===\n{}\n=== END LOG ===", self.daemon_log());
        }
        reached
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_dir().join("daemon.log")).unwrap_or_default()
    }

    fn daemon_pid(&self) -> Option<u32> {
        let raw = std::fs::read_to_string(self.state_dir().join("daemon.pid")).ok()?;
        raw.trim().parse().ok()
    }

    /// SIGKILL the daemon, skipping graceful shutdown.
    pub fn daemon_kill(&self) -> bool {
        let Some(pid) = self.daemon_pid() else {
            return false;
        };
        let killed = std::process::Command::new("kill")
            .args(["-9", &pid.to_string()])
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        killed
            && wait_for(SPEC_WAIT_MAX_MS, || {
                !Path::new(&format!("/proc/{pid}")).exists()
            })
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        if self.state_dir().join("daemon.sock").exists() {
            let _ = self.vigil().args(&["daemon", "stop"]).run();
        }
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    fn new() -> Self {
        let mut cmd = assert_cmd::Command::cargo_bin("vigil").unwrap();
        cmd.timeout(Duration::from_millis(SPEC_WAIT_MAX_MS * 2));
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn run(mut self) -> RunOutput {
        RunOutput { output: self.cmd.output().unwrap() }
    }

    /// Run and require exit code 0.
    pub fn passes(self) -> RunOutput {
        let out = self.run();
        assert!(out.output.status.success(), "expected success\n{out}");
        out
    }

    /// Run and require a non-zero exit code.
    pub fn fails(self) -> RunOutput {
        let out = self.run();
        assert!(!out.output.status.success(), "expected failure\n{out}");
        out
    }

    /// Run and require a specific exit code.
    pub fn exits(self, code: i32) -> RunOutput {
        let out = self.run();
        assert_eq!(out.output.status.code(), Some(code), "unexpected exit code\n{out}");
        out
    }
}

pub struct RunOutput {
    output: Output,
}

impl RunOutput {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(&self, expected: &str) -> &Self {
        assert!(self.stdout().contains(expected), "stdout missing {expected:?}\n{self}");
        self
    }

    pub fn stdout_lacks(&self, unexpected: &str) -> &Self {
        assert!(!self.stdout().contains(unexpected), "stdout has {unexpected:?}\n{self}");
        self
    }

    pub fn stderr_has(&self, expected: &str) -> &Self {
        assert!(self.stderr().contains(expected), "stderr missing {expected:?}\n{self}");
        self
    }
}

impl std::fmt::Display for RunOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "status: {}\n--- stdout ---\n{}\n--- stderr ---\n{}",
            self.output.status,
            self.stdout(),
            self.stderr()
        )
    }
}
