// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};
use anyhow::anyhow;
use clap::Args;
use taro_core::ExecutionState;
use taro_daemon::Config;
use taro_wire::{ExecuteSpec, Request, Response, Selector};

#[derive(Args)]
pub struct ExecArgs {
    /// Job identifier used for disable patterns and history grouping.
    /// Defaults to the command's basename.
    #[arg(long)]
    pub job_id: Option<String>,
    /// Hold the instance PENDING until `taro release LATCH`.
    #[arg(long)]
    pub pending: Option<String>,
    /// Skip output capture (no tail buffer, no OutputLine events).
    #[arg(short = 'b', long)]
    pub bypass_output: bool,
    pub command: String,
    pub args: Vec<String>,
}

pub async fn exec(config: &Config, args: ExecArgs, format: OutputFormat) -> anyhow::Result<i32> {
    let job_id = args.job_id.unwrap_or_else(|| {
        std::path::Path::new(&args.command)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.command.clone())
    });
    let spec = ExecuteSpec {
        job_id,
        command: args.command,
        argv: args.args,
        pending_latch: args.pending,
        bypass_output: args.bypass_output,
    };

    let client = connect(config).await?;
    let instance_id = match client.send(&Request::Execute(spec)).await.map_err(unreachable_to_exit)? {
        Response::Executed { instance_id } => instance_id,
        other => return Err(unexpected(other)),
    };

    let terminal = instance_terminal_state(config, &instance_id).await?;

    let payload = serde_json::json!({ "state": terminal.state, "error": terminal.error });
    format_or_json(format, &payload, || {
        if terminal.state.is_failure() {
            if let Some(error) = &terminal.error {
                eprintln!("{instance_id}: {} ({error})", terminal.state);
                return;
            }
        }
        println!("{instance_id}: {}", terminal.state);
    })?;
    Ok(if terminal.state.is_failure() { 1 } else { 0 })
}

/// What `exec` needs about the instance once it stops changing: the state
/// itself and, for a failure-bit terminal, the reason (spec.md §7).
struct TerminalOutcome {
    state: ExecutionState,
    error: Option<String>,
}

/// Poll `ps` until the instance reaches a terminal state (spec.md §8 exec
/// scenarios: `exec` blocks until COMPLETED/STOPPED/INTERRUPTED/FAILED).
async fn instance_terminal_state(config: &Config, instance_id: &taro_core::InstanceId) -> anyhow::Result<TerminalOutcome> {
    loop {
        let client = connect(config).await?;
        match client.send(&Request::Ps).await.map_err(unreachable_to_exit)? {
            Response::Ps { instances } => {
                if let Some(instance) = instances.into_iter().find(|i| &i.instance_id == instance_id) {
                    if instance.state.is_terminal() {
                        return Ok(TerminalOutcome { state: instance.state, error: instance.error });
                    }
                } else {
                    return Ok(TerminalOutcome { state: ExecutionState::Completed, error: None });
                }
            }
            other => return Err(unexpected(other)),
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

pub async fn ps(config: &Config, format: OutputFormat) -> anyhow::Result<i32> {
    let client = connect(config).await?;
    match client.send(&Request::Ps).await.map_err(unreachable_to_exit)? {
        Response::Ps { instances } => {
            format_or_json(format, &instances, || {
                for instance in &instances {
                    println!("{}\t{}\t{}", instance.instance_id, instance.job_id, instance.state);
                }
            })?;
            Ok(0)
        }
        other => Err(unexpected(other)),
    }
}

pub async fn stop(config: &Config, selector: &str) -> anyhow::Result<i32> {
    let client = connect(config).await?;
    match client.send(&Request::Stop(parse_selector(selector))).await.map_err(unreachable_to_exit)? {
        Response::Ok => Ok(0),
        Response::Error(e) => Err(command_error_to_exit(e)),
        other => Err(unexpected(other)),
    }
}

pub async fn interrupt(config: &Config, selector: &str) -> anyhow::Result<i32> {
    let client = connect(config).await?;
    match client.send(&Request::Interrupt(parse_selector(selector))).await.map_err(unreachable_to_exit)? {
        Response::Ok => Ok(0),
        Response::Error(e) => Err(command_error_to_exit(e)),
        other => Err(unexpected(other)),
    }
}

pub async fn release(config: &Config, latch: &str, format: OutputFormat) -> anyhow::Result<i32> {
    let client = connect(config).await?;
    match client.send(&Request::Release { latch: latch.to_string() }).await.map_err(unreachable_to_exit)? {
        Response::Released { count } => {
            format_or_json(format, &serde_json::json!({ "released": count }), || println!("released {count}"))?;
            Ok(0)
        }
        other => Err(unexpected(other)),
    }
}

pub async fn wait(config: &Config, state: &str, timeout_ms: Option<u64>) -> anyhow::Result<i32> {
    let client = connect(config).await?;
    match client
        .send(&Request::Wait { state: state.to_string(), timeout_ms })
        .await
        .map_err(unreachable_to_exit)?
    {
        Response::Waited { event } => {
            println!("{}", event.log_summary());
            Ok(0)
        }
        Response::Timeout => Ok(1),
        Response::Error(e) => Err(command_error_to_exit(e)),
        other => Err(unexpected(other)),
    }
}

fn parse_selector(raw: &str) -> Selector {
    if raw.contains('#') {
        Selector::Instance(taro_core::InstanceId::from(raw))
    } else {
        Selector::Job(raw.to_string())
    }
}

async fn connect(config: &Config) -> anyhow::Result<DaemonClient> {
    DaemonClient::connect_or_start(config).await.map_err(unreachable_to_exit)
}

pub(crate) fn unreachable_to_exit(e: crate::client::ClientError) -> anyhow::Error {
    if e.is_unreachable() {
        anyhow::Error::new(ExitError::new(2, e.to_string()))
    } else {
        anyhow!(e)
    }
}

pub(crate) fn command_error_to_exit(e: taro_wire::CommandError) -> anyhow::Error {
    match e {
        taro_wire::CommandError::UserError { message } => anyhow::Error::new(ExitError::new(1, message)),
        taro_wire::CommandError::PersistenceRequired => {
            anyhow::Error::new(ExitError::new(3, "persistence is disabled".to_string()))
        }
    }
}

pub(crate) fn unexpected(response: Response) -> anyhow::Error {
    anyhow!("unexpected response from daemon: {response:?}")
}
