// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared by the job-instance lifecycle engine.

use crate::instance::InstanceId;
use crate::state::ExecutionState;
use thiserror::Error;

/// Errors raised by the core lifecycle engine.
///
/// Policy (spec.md §7): `IllegalTransition`, `UnknownInstance`,
/// `UnknownLatch`, and `PersistenceRequired` are returned to the caller with
/// no state change. `SpawnFailure` drives the instance to `FAILED`.
/// `PersistenceFailure` is logged but never unwinds a transition that has
/// already happened. `SubscriberOverflow` only increments a counter.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to spawn child process: {0}")]
    SpawnFailure(String),

    #[error("instance {instance} cannot transition from {from} to {to}")]
    IllegalTransition { instance: InstanceId, from: ExecutionState, to: ExecutionState },

    #[error("unknown instance: {0}")]
    UnknownInstance(InstanceId),

    #[error("unknown latch: {0}")]
    UnknownLatch(String),

    #[error("persistence is required for this operation but is disabled")]
    PersistenceRequired,

    #[error("persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("timed out waiting for a matching event")]
    Timeout,

    #[error("subscriber queue overflowed, event dropped")]
    SubscriberOverflow,
}

pub type CoreResult<T> = Result<T, CoreError>;
