// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job/instance identifiers and the [`JobInstance`] record itself.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::state::ExecutionState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A short, caller-chosen identifier for a job (spec.md §3: "JobID").
///
/// Unlike [`InstanceId`], this is never generated — the caller supplies it
/// (e.g. `"nightly-build"`). Job and instance ids are both plain `String`
/// newtypes: a fixed-capacity inline buffer would need to cap caller-chosen
/// job names at an arbitrary length, which spec.md never requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JobId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Globally-unique (within a supervisor's lifetime) identifier for one
/// execution of a job: `{job_id}#{monotonic}` (spec.md §3: "InstanceID").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for InstanceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Monotonic generator of [`InstanceId`]s, one per supervisor process.
///
/// Not persisted across restarts: a restarted supervisor starts its counter
/// over, which is fine because it also never re-attaches to prior instances
/// (spec.md §9, crash recovery).
#[derive(Debug, Default)]
pub struct InstanceIdGen {
    next: AtomicU64,
}

impl InstanceIdGen {
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    pub fn next(&self, job_id: &JobId) -> InstanceId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        InstanceId(format!("{}#{n}", job_id.0))
    }
}

/// Internal flag set by `stop`/`interrupt`, selecting the terminal state
/// once the child exits (spec.md §4.1, "termination intent").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationIntent {
    None,
    Stop,
    Interrupt,
}

impl TerminationIntent {
    /// First request wins (spec.md §4.1 tie-break); later requests are no-ops.
    pub fn request(&mut self, requested: TerminationIntent) {
        if *self == TerminationIntent::None {
            *self = requested;
        }
    }
}

/// What the caller asked the supervisor to admit (spec.md §4.8, `execute(spec)`).
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub job_id: JobId,
    pub command: String,
    pub argv: Vec<String>,
    pub pending_latch: Option<String>,
    pub bypass_output: bool,
}

impl JobSpec {
    pub fn new(job_id: impl Into<JobId>, command: impl Into<String>, argv: Vec<String>) -> Self {
        Self { job_id: job_id.into(), command: command.into(), argv, pending_latch: None, bypass_output: false }
    }

    crate::setters! {
        option {
            pending_latch: String,
        }
        set {
            bypass_output: bool,
        }
    }
}

/// One execution of a job (spec.md §3: "JobInstance").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInstance {
    pub instance_id: InstanceId,
    pub job_id: JobId,
    pub command: String,
    pub argv: Vec<String>,
    pub created_at_epoch_ms: u64,
    pub state: ExecutionState,
    /// Epoch-ms timestamp of entry into every state visited so far.
    pub state_entered_at: HashMap<ExecutionState, u64>,
    pub pending_latch: Option<String>,
    pub termination_intent: TerminationIntent,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
}

impl JobInstance {
    pub fn new(instance_id: InstanceId, spec: &JobSpec, clock: &impl Clock) -> Self {
        let now = clock.epoch_ms();
        let mut state_entered_at = HashMap::new();
        state_entered_at.insert(ExecutionState::None, now);
        Self {
            instance_id,
            job_id: spec.job_id.clone(),
            command: spec.command.clone(),
            argv: spec.argv.clone(),
            created_at_epoch_ms: now,
            state: ExecutionState::None,
            state_entered_at,
            pending_latch: spec.pending_latch.clone(),
            termination_intent: TerminationIntent::None,
            exit_code: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Apply a validated transition, recording its entry timestamp.
    ///
    /// Callers go through [`crate::state_machine::InstanceStateMachine`]
    /// rather than calling this directly, so the transition has already been
    /// checked against the graph.
    pub(crate) fn enter_state(&mut self, to: ExecutionState, at_epoch_ms: u64) {
        self.state = to;
        self.state_entered_at.insert(to, at_epoch_ms);
    }

    pub fn entered_at(&self, state: ExecutionState) -> Option<u64> {
        self.state_entered_at.get(&state).copied()
    }

    /// Require the instance is not yet terminal, for ops like `stop`/`release`.
    pub fn require_live(&self) -> CoreResult<()> {
        if self.is_terminal() {
            Err(CoreError::IllegalTransition { instance: self.instance_id.clone(), from: self.state, to: self.state })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
