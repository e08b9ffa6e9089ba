// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket listener: accepts connections and dispatches `taro-wire`
//! requests against the [`Supervisor`] (spec.md §4.12, §6).

use crate::supervisor::{self, Supervisor};
use std::sync::Arc;
use std::time::Duration;
use taro_core::{CoreError, DropPolicy, Event, EventFilter, ExecutionState, InstanceId, Stream, TailLine};
use taro_wire::{
    read_framed, write_framed, CommandError, DisabledRecordDto, HistoryRecordDto, ProtocolError, Request, Response,
    Selector as WireSelector, TailLineDto,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

pub struct ListenCtx {
    pub supervisor: Arc<Supervisor>,
}

/// Accepts connections on a Unix socket and spawns a task per connection.
pub struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

#[derive(Debug, Error)]
enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::Io(_)) => debug!("client disconnected"),
        _ => error!(error = %e, "connection error"),
    }
}

async fn handle_connection<R, W>(mut reader: R, mut writer: W, ctx: &ListenCtx) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let request: Request = read_framed(&mut reader).await?;
    info!(request = ?request, "received request");

    match request {
        Request::Listen => stream_events(&mut writer, ctx).await,
        Request::Tail { instance, follow } => stream_tail(&mut writer, ctx, instance, follow).await,
        other => {
            let response = handle_request(other, ctx).await;
            write_framed(&mut writer, &response).await?;
            Ok(())
        }
    }
}

/// `listen`: stream every `StateChanged` event until the client disconnects
/// (spec.md §6: "until interrupted").
async fn stream_events<W: AsyncWrite + Unpin>(writer: &mut W, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let sub = ctx.supervisor.subscribe(EventFilter::All, 256, DropPolicy::DropOldest);
    loop {
        let event = sub.recv().await;
        if matches!(event, Event::StateChanged { .. }) {
            write_framed(writer, &Response::Event(event)).await?;
        }
    }
}

/// `tail [-f]`: print the buffered tail, then (with `follow`) keep streaming
/// new lines until the instance reaches a terminal state.
async fn stream_tail<W: AsyncWrite + Unpin>(
    writer: &mut W,
    ctx: &ListenCtx,
    instance: InstanceId,
    follow: bool,
) -> Result<(), ConnectionError> {
    let lines = match ctx.supervisor.tail_snapshot(&instance) {
        Some(lines) => lines,
        None => {
            let message = format!("unknown instance: {instance}");
            write_framed(writer, &Response::Error(CommandError::UserError { message })).await?;
            return Ok(());
        }
    };
    write_framed(writer, &Response::Tail { lines: lines.into_iter().map(tail_line_dto).collect() }).await?;
    if !follow {
        return Ok(());
    }

    let Some((mut rx, _tail)) = ctx.supervisor.tail_follow(&instance) else {
        return Ok(());
    };
    let state_events = ctx.supervisor.subscribe(EventFilter::Instance(instance), 64, DropPolicy::DropOldest);
    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Ok(line) => {
                    write_framed(writer, &Response::Tail { lines: vec![tail_line_dto(line)] }).await?;
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            event = state_events.recv() => {
                if event.is_terminal_state_change() {
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Execute(spec) => match ctx.supervisor.execute(to_execute_spec(spec)).await {
            Ok(instance_id) => Response::Executed { instance_id },
            Err(e) => error_response(e),
        },
        Request::Ps => Response::Ps { instances: ctx.supervisor.ps() },
        Request::Stop(selector) => match ctx.supervisor.stop(to_selector(selector)).await {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        },
        Request::Interrupt(selector) => match ctx.supervisor.interrupt(to_selector(selector)).await {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        },
        Request::Release { latch } => Response::Released { count: ctx.supervisor.release(&latch) },
        Request::Wait { state, timeout_ms } => handle_wait(ctx, &state, timeout_ms).await,
        Request::History(filter) => match ctx.supervisor.history(&taro_storage::HistoryQuery {
            job_id: filter.job_id,
            since: filter.since,
            until: filter.until,
            terminal_class: if filter.failures_only { Some(taro_storage::TerminalClass::Failure) } else { None },
        }) {
            Ok(records) => Response::History { records: records.into_iter().map(history_record_dto).collect() },
            Err(e) => error_response(e),
        },
        Request::Disable { patterns, regex } => {
            let kind = if regex { taro_storage::PatternKind::Regex } else { taro_storage::PatternKind::Exact };
            match ctx.supervisor.disable(&patterns, kind, None) {
                Ok(()) => Response::Ok,
                Err(e) => error_response(e),
            }
        }
        Request::Enable { patterns } => match ctx.supervisor.enable(&patterns) {
            Ok(_) => Response::Ok,
            Err(e) => error_response(e),
        },
        Request::ListDisabled => match ctx.supervisor.list_disabled() {
            Ok(records) => Response::Disabled { records: records.into_iter().map(disabled_record_dto).collect() },
            Err(e) => error_response(e),
        },
        Request::Listen | Request::Tail { .. } => unreachable!("handled in handle_connection"),
    }
}

async fn handle_wait(ctx: &ListenCtx, state: &str, timeout_ms: Option<u64>) -> Response {
    let Some(target) = parse_execution_state(state) else {
        return Response::Error(CommandError::UserError { message: format!("unknown state: {state}") });
    };
    let timeout = timeout_ms.map(Duration::from_millis);
    let predicate = move |event: &Event| matches!(event, Event::StateChanged { to, .. } if *to == target);
    match ctx.supervisor.wait(predicate, timeout).await {
        Ok(event) => Response::Waited { event },
        Err(CoreError::Timeout) => Response::Timeout,
        Err(e) => error_response(e),
    }
}

fn error_response(e: CoreError) -> Response {
    match e {
        CoreError::PersistenceRequired => Response::Error(CommandError::PersistenceRequired),
        other => Response::Error(CommandError::UserError { message: other.to_string() }),
    }
}

fn to_execute_spec(spec: taro_wire::ExecuteSpec) -> supervisor::ExecuteSpec {
    supervisor::ExecuteSpec {
        job_id: spec.job_id,
        command: spec.command,
        argv: spec.argv,
        pending_latch: spec.pending_latch,
        bypass_output: spec.bypass_output,
    }
}

fn to_selector(selector: WireSelector) -> supervisor::Selector {
    match selector {
        WireSelector::Instance(id) => supervisor::Selector::Instance(id),
        WireSelector::Job(job_id) => supervisor::Selector::Job(job_id),
    }
}

fn tail_line_dto(line: TailLine) -> TailLineDto {
    TailLineDto {
        stream: match line.stream {
            Stream::Stdout => "stdout".to_string(),
            Stream::Stderr => "stderr".to_string(),
        },
        text: line.text,
        at_epoch_ms: line.at_epoch_ms,
    }
}

fn history_record_dto(record: taro_storage::HistoryRecord) -> HistoryRecordDto {
    let tail = record.tail_text().unwrap_or_else(|e| {
        warn!(error = %e, "failed to decompress history tail");
        String::new()
    });
    let state = parse_execution_state(&record.state).unwrap_or(ExecutionState::Failed);
    HistoryRecordDto {
        instance_id: InstanceId::from(record.instance_id.as_str()),
        job_id: record.job_id,
        command: record.command,
        created_at: record.created_at,
        terminated_at: record.terminated_at,
        state,
        exit_code: record.exit_code,
        error: record.error,
        tail,
    }
}

fn disabled_record_dto(record: taro_storage::DisabledRecord) -> DisabledRecordDto {
    DisabledRecordDto {
        pattern: record.pattern,
        regex: record.kind == taro_storage::PatternKind::Regex,
        at: record.at,
        by: record.by,
    }
}

fn parse_execution_state(s: &str) -> Option<ExecutionState> {
    Some(match s {
        "none" => ExecutionState::None,
        "created" => ExecutionState::Created,
        "pending" => ExecutionState::Pending,
        "disabled" => ExecutionState::Disabled,
        "running" => ExecutionState::Running,
        "completed" => ExecutionState::Completed,
        "stopped" => ExecutionState::Stopped,
        "interrupted" => ExecutionState::Interrupted,
        "failed" => ExecutionState::Failed,
        _ => return None,
    })
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
