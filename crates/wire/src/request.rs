// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests sent by `taro` (the CLI) to `tarod` over the local socket
//! (spec.md §4.8, §6).

use serde::{Deserialize, Serialize};
use taro_core::InstanceId;

/// Selects a target for `stop`/`interrupt`: either a single instance or
/// every live instance of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    Instance(InstanceId),
    Job(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSpec {
    pub job_id: String,
    pub command: String,
    pub argv: Vec<String>,
    pub pending_latch: Option<String>,
    pub bypass_output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub job_id: Option<String>,
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub failures_only: bool,
}

/// One request, one connection, one response — except `Listen` and
/// `Tail { follow: true }`, which keep the connection open and stream
/// `Response::Event` frames until the client disconnects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Execute(ExecuteSpec),
    Ps,
    Stop(Selector),
    Interrupt(Selector),
    Release { latch: String },
    Listen,
    Wait { state: String, timeout_ms: Option<u64> },
    Tail { instance: InstanceId, follow: bool },
    History(HistoryFilter),
    Disable { patterns: Vec<String>, regex: bool },
    Enable { patterns: Vec<String> },
    ListDisabled,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
