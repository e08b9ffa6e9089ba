// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use taro_daemon::Config;
use taro_wire::{Request, Response};

pub async fn disable(config: &Config, patterns: Vec<String>, regex: bool) -> anyhow::Result<i32> {
    let client = DaemonClient::connect_or_start(config).await.map_err(super::job::unreachable_to_exit)?;
    match client.send(&Request::Disable { patterns, regex }).await.map_err(super::job::unreachable_to_exit)? {
        Response::Ok => Ok(0),
        Response::Error(e) => Err(super::job::command_error_to_exit(e)),
        other => Err(super::job::unexpected(other)),
    }
}

pub async fn enable(config: &Config, patterns: Vec<String>, format: OutputFormat) -> anyhow::Result<i32> {
    let client = DaemonClient::connect_or_start(config).await.map_err(super::job::unreachable_to_exit)?;
    match client.send(&Request::Enable { patterns }).await.map_err(super::job::unreachable_to_exit)? {
        Response::Ok => {
            format_or_json(format, &serde_json::json!({ "status": "ok" }), || println!("ok"))?;
            Ok(0)
        }
        Response::Error(e) => Err(super::job::command_error_to_exit(e)),
        other => Err(super::job::unexpected(other)),
    }
}

pub async fn list_disabled(config: &Config, format: OutputFormat) -> anyhow::Result<i32> {
    let client = DaemonClient::connect_or_start(config).await.map_err(super::job::unreachable_to_exit)?;
    match client.send(&Request::ListDisabled).await.map_err(super::job::unreachable_to_exit)? {
        Response::Disabled { records } => {
            format_or_json(format, &records, || {
                for record in &records {
                    let kind = if record.regex { "regex" } else { "exact" };
                    println!("{}\t{}", record.pattern, kind);
                }
            })?;
            Ok(0)
        }
        Response::Error(e) => Err(super::job::command_error_to_exit(e)),
        other => Err(super::job::unexpected(other)),
    }
}
