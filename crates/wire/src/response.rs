// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses sent by `tarod` back to `taro` (spec.md §4.8, §6).

use serde::{Deserialize, Serialize};
use taro_core::{Event, ExecutionState, InstanceId, JobInstance};

/// Exit-code-bearing command error, distinct from a protocol-level
/// [`crate::framing::ProtocolError`] (spec.md §6: exit codes 1/2/3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandError {
    /// Bad arguments, unknown instance/job, illegal transition — exit 1.
    UserError { message: String },
    /// Persistence is disabled but the command requires it — exit 3.
    PersistenceRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecordDto {
    pub instance_id: InstanceId,
    pub job_id: String,
    pub command: String,
    pub created_at: i64,
    pub terminated_at: i64,
    pub state: ExecutionState,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
    pub tail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledRecordDto {
    pub pattern: String,
    pub regex: bool,
    pub at: i64,
    pub by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailLineDto {
    pub stream: String,
    pub text: String,
    pub at_epoch_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Response {
    /// Acknowledges a request with no payload (e.g. `release`'s count is
    /// carried by `Released`, so plain `Ok` covers `enable`/`disable`).
    Ok,
    Executed { instance_id: InstanceId },
    Ps { instances: Vec<JobInstance> },
    Released { count: usize },
    /// One frame per event on `listen` / `tail -f`; the stream ends when the
    /// connection closes or (for `tail -f`) the instance reaches terminal.
    Event(Event),
    Waited { event: Event },
    Timeout,
    Tail { lines: Vec<TailLineDto> },
    History { records: Vec<HistoryRecordDto> },
    Disabled { records: Vec<DisabledRecordDto> },
    Error(CommandError),
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
