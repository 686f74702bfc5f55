// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vigil start | status | list | cancel | purge`

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Args;
use vigil_core::ContainerPolicy;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};
use crate::request_config::RequestConfig;

use super::supervision_display::{print_detail, print_summaries};

#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Resource group hosting the job [env: ResourceGroup]
    #[arg(long)]
    pub resource_group: Option<String>,

    /// Container group to restart and watch [env: ACIGroup]
    #[arg(long)]
    pub group: Option<String>,

    /// Minutes between status checks [env: PollingIntervalInMinutes]
    #[arg(long)]
    pub interval: Option<u32>,

    /// Minutes before giving up [env: MaxProcessingTimeInMinutes]
    #[arg(long)]
    pub max: Option<u32>,

    /// Which containers decide completion: first, all, any, name:<container>
    #[arg(long)]
    pub container_policy: Option<ContainerPolicy>,
}

impl StartArgs {
    fn into_config(self) -> RequestConfig {
        RequestConfig {
            resource_group: self.resource_group,
            job_group: self.group,
            polling_interval_minutes: self.interval,
            max_processing_time_minutes: self.max,
            container_policy: self.container_policy,
        }
    }
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Supervision id (or unique prefix)
    pub id: String,

    /// Keep polling until the supervision finishes; exit status reflects the verdict
    #[arg(long)]
    pub wait: bool,

    /// Seconds between checks with --wait
    #[arg(long, default_value = "5", requires = "wait")]
    pub poll_secs: u64,
}

pub async fn start(args: StartArgs, format: OutputFormat) -> Result<()> {
    let request = RequestConfig::from_env()?.overridden_by(args.into_config()).build()?;
    if request.policy.interval_exceeds_max() {
        eprintln!(
            "warning: polling interval ({}m) exceeds max processing time ({}m); the job is checked only at start and at the deadline",
            request.policy.polling_interval_minutes, request.policy.max_processing_time_minutes
        );
    }

    let client = DaemonClient::connect_or_start().await?;
    let target = request.target.to_string();
    let id = client.start(request).await?;

    let obj = serde_json::json!({
        "id": id,
        "target": target,
        "status_command": format!("vigil status {id}"),
    });
    format_or_json(format, &obj, || {
        println!("Started supervision {id} for {target}");
        println!("Check progress with: vigil status {id}");
    })
}

pub async fn status(args: StatusArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let poll = Duration::from_secs(args.poll_secs.max(1));

    let detail = loop {
        let detail = client
            .status(&args.id)
            .await?
            .ok_or_else(|| anyhow!("supervision not found: {}", args.id))?;
        if !args.wait || detail.is_terminal() {
            break detail;
        }
        tokio::select! {
            _ = tokio::time::sleep(poll) => {}
            _ = tokio::signal::ctrl_c() => break detail,
        }
    };

    format_or_json(format, &detail, || {
        let mut out = std::io::stdout().lock();
        let _ = print_detail(&mut out, &detail);
    })?;

    match ExitError::for_status(detail.status).filter(|_| args.wait) {
        Some(exit) => Err(exit.into()),
        None => Ok(()),
    }
}

pub async fn list(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let instances = client.list().await?;
    format_or_json(format, &instances, || {
        let mut out = std::io::stdout().lock();
        let _ = print_summaries(&mut out, &instances);
    })
}

pub async fn cancel(id: String, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let root = client.cancel(&id).await?;
    let obj = serde_json::json!({ "cancelled": root });
    format_or_json(format, &obj, || println!("Cancelled supervision {root}"))
}

pub async fn purge(id: Option<String>, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect()?;
    let purged = client.purge(id.as_deref()).await?;
    let obj = serde_json::json!({ "purged": purged });
    format_or_json(format, &obj, || {
        for id in &purged {
            println!("Purged {id}");
        }
        println!("{} supervision(s) purged", purged.len());
    })
}
