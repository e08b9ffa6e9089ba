// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job-instance execution state machine's transition graph.
//!
//! States only ever move forward; see [`ExecutionState::can_transition_to`]
//! for the full graph (spec.md §4.1).

use serde::{Deserialize, Serialize};

/// A state a [`crate::instance::JobInstance`] can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    None,
    Created,
    Pending,
    Disabled,
    Running,
    Completed,
    Stopped,
    Interrupted,
    Failed,
}

crate::simple_display! {
    ExecutionState {
        None => "none",
        Created => "created",
        Pending => "pending",
        Disabled => "disabled",
        Running => "running",
        Completed => "completed",
        Stopped => "stopped",
        Interrupted => "interrupted",
        Failed => "failed",
    }
}

impl ExecutionState {
    /// True for states that never transition further.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionState::Disabled
                | ExecutionState::Completed
                | ExecutionState::Stopped
                | ExecutionState::Interrupted
                | ExecutionState::Failed
        )
    }

    /// True for terminal states that count as a failed execution.
    pub fn is_failure(self) -> bool {
        matches!(self, ExecutionState::Interrupted | ExecutionState::Failed)
    }

    /// Whether `to` is a legal sink from `self` in the transition graph.
    ///
    /// A state transitioning to itself is always legal (idempotent retry of
    /// the same `transition` call), except once terminal — terminals have no
    /// outgoing edges, including self-edges.
    pub fn can_transition_to(self, to: ExecutionState) -> bool {
        if self == to {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (ExecutionState::None, ExecutionState::Created)
                | (
                    ExecutionState::Created,
                    ExecutionState::Pending | ExecutionState::Disabled | ExecutionState::Running
                )
                | (
                    ExecutionState::Pending,
                    ExecutionState::Running
                        | ExecutionState::Stopped
                        | ExecutionState::Interrupted
                )
                | (
                    ExecutionState::Running,
                    ExecutionState::Completed
                        | ExecutionState::Stopped
                        | ExecutionState::Interrupted
                        | ExecutionState::Failed
                )
        )
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
