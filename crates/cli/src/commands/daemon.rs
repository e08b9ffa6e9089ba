// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `taro daemon` — manage the `tarod` process itself.

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use clap::{Args, Subcommand};
use std::process::Stdio;
use taro_daemon::Config;
use taro_wire::Request;

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `tarod` in the background if it isn't already running.
    Start,
    /// Ask a running `tarod` to interrupt every live instance and exit.
    Stop,
    /// Report whether `tarod` is reachable.
    Status,
}

pub async fn daemon(config: &Config, args: DaemonArgs, format: OutputFormat) -> anyhow::Result<i32> {
    match args.command {
        DaemonCommand::Start => start(config, format).await,
        DaemonCommand::Stop => stop(config, format).await,
        DaemonCommand::Status => status(config, format).await,
    }
}

async fn start(config: &Config, format: OutputFormat) -> anyhow::Result<i32> {
    if DaemonClient::connect(config).await.is_ok() {
        format_or_json(format, &serde_json::json!({ "status": "already_running" }), || {
            println!("daemon already running")
        })?;
        return Ok(0);
    }
    DaemonClient::connect_or_start(config).await.map_err(super::job::unreachable_to_exit)?;
    format_or_json(format, &serde_json::json!({ "status": "started" }), || println!("daemon started"))?;
    Ok(0)
}

/// There is no remote-shutdown request in the wire protocol (spec.md §6:
/// the daemon exits only on SIGTERM/SIGINT), so `stop` sends the signal to
/// the process that holds the lock file's recorded PID.
async fn stop(config: &Config, format: OutputFormat) -> anyhow::Result<i32> {
    if DaemonClient::connect(config).await.is_err() {
        format_or_json(format, &serde_json::json!({ "status": "not_running" }), || {
            println!("daemon not running")
        })?;
        return Ok(0);
    }
    let pid_text = std::fs::read_to_string(&config.lock_path)?;
    let pid: i32 = pid_text.trim().parse().map_err(|_| anyhow::anyhow!("malformed pid file {}", config.lock_path.display()))?;
    signal_terminate(pid)?;
    format_or_json(format, &serde_json::json!({ "status": "stopped" }), || println!("daemon stopping"))?;
    Ok(0)
}

async fn status(config: &Config, format: OutputFormat) -> anyhow::Result<i32> {
    match DaemonClient::connect(config).await {
        Ok(client) => match client.send(&Request::Ps).await {
            Ok(taro_wire::Response::Ps { instances }) => {
                format_or_json(
                    format,
                    &serde_json::json!({ "status": "running", "instances": instances.len() }),
                    || println!("running ({} live instance(s))", instances.len()),
                )?;
                Ok(0)
            }
            _ => {
                format_or_json(format, &serde_json::json!({ "status": "unreachable" }), || {
                    println!("socket present but daemon did not respond")
                })?;
                Ok(2)
            }
        },
        Err(_) => {
            format_or_json(format, &serde_json::json!({ "status": "not_running" }), || {
                println!("daemon not running")
            })?;
            Ok(0)
        }
    }
}

fn signal_terminate(pid: i32) -> anyhow::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(|e| anyhow::anyhow!("failed to signal daemon (pid {pid}): {e}"))?;
    Ok(())
}

#[allow(dead_code)]
fn spawn_detached(exe: &std::path::Path) -> std::io::Result<std::process::Child> {
    std::process::Command::new(exe).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null()).spawn()
}
