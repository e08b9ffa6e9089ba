// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use clap::Args;
use taro_daemon::Config;
use taro_wire::{HistoryFilter, Request, Response};

#[derive(Args)]
pub struct HistoryArgs {
    #[arg(long)]
    pub job_id: Option<String>,
    #[arg(long)]
    pub since: Option<i64>,
    #[arg(long)]
    pub until: Option<i64>,
    #[arg(long)]
    pub failures_only: bool,
}

pub async fn history(config: &Config, args: HistoryArgs, format: OutputFormat) -> anyhow::Result<i32> {
    let client = DaemonClient::connect_or_start(config).await.map_err(super::job::unreachable_to_exit)?;
    let filter = HistoryFilter {
        job_id: args.job_id,
        since: args.since,
        until: args.until,
        failures_only: args.failures_only,
    };
    match client.send(&Request::History(filter)).await.map_err(super::job::unreachable_to_exit)? {
        Response::History { records } => {
            format_or_json(format, &records, || {
                for record in &records {
                    println!(
                        "{}\t{}\t{}\texit={:?}",
                        record.instance_id, record.job_id, record.state, record.exit_code
                    );
                }
            })?;
            Ok(0)
        }
        Response::Error(e) => Err(super::job::command_error_to_exit(e)),
        other => Err(super::job::unexpected(other)),
    }
}
