// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil daemon` - Daemon management commands

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use std::process::Command;

use crate::client::DaemonClient;
use crate::daemon_process::{self, find_vigild_binary};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args, Debug)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Start the daemon (background unless --foreground)
    Start {
        /// Run in the foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon; running supervisions resume on next start
    Stop,
    /// Check whether the daemon is running
    Status,
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground).await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Status => status(format).await,
    }
}

async fn start(foreground: bool) -> Result<()> {
    if foreground {
        let status = Command::new(find_vigild_binary()).status()?;
        if !status.success() {
            return Err(anyhow!("Daemon exited with status: {}", status));
        }
        return Ok(());
    }

    if let Ok(client) = DaemonClient::connect() {
        if client.ping().await.is_ok() {
            println!("Daemon already running");
            return Ok(());
        }
    }
    DaemonClient::connect_or_start().await?;
    println!("Daemon started");
    Ok(())
}

async fn stop() -> Result<()> {
    match daemon_process::stop().await {
        Ok(true) => println!("Daemon stopped"),
        Ok(false) => println!("Daemon not running"),
        Err(e) => return Err(anyhow!("Failed to stop daemon: {}", e)),
    }
    Ok(())
}

async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(client) => client,
        Err(_) => return print_not_running(format),
    };
    let version = match client.hello().await {
        Ok(version) => version,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(e.into()),
    };
    let instances = client.list().await?;
    let running = instances.iter().filter(|i| !i.status.is_terminal()).count();

    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "socket": client.socket_path(),
        "supervisions": instances.len(),
        "supervisions_running": running,
    });
    format_or_json(format, &obj, || {
        println!("Status: running");
        println!("Version: {}", version);
        println!("Supervisions: {} ({} running)", instances.len(), running);
    })
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    let obj = serde_json::json!({ "status": "not_running" });
    format_or_json(format, &obj, || println!("Daemon not running"))
}
