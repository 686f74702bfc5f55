// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vigil: trigger and inspect job supervisions.

mod client;
mod color;
mod commands;
mod daemon_process;
mod exit_error;
mod output;
mod request_config;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::daemon::DaemonArgs;
use commands::supervision::{StartArgs, StatusArgs};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "Durable supervision of long-running container jobs",
    styles = color::styles()
)]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restart a job and supervise it until it finishes or times out
    Start(StartArgs),
    /// Show a supervision's status
    Status(StatusArgs),
    /// List supervisions, newest first
    List,
    /// Cancel a supervision
    Cancel {
        /// Supervision id (or unique prefix)
        id: String,
    },
    /// Remove finished supervisions
    Purge {
        /// Only this supervision (default: every finished one)
        id: Option<String>,
    },
    /// Daemon management
    Daemon(DaemonArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("Error: {}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output;
    match cli.command {
        Commands::Start(args) => commands::supervision::start(args, format).await,
        Commands::Status(args) => commands::supervision::status(args, format).await,
        Commands::List => commands::supervision::list(format).await,
        Commands::Cancel { id } => commands::supervision::cancel(id, format).await,
        Commands::Purge { id } => commands::supervision::purge(id, format).await,
        Commands::Daemon(args) => commands::daemon::daemon(args, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
