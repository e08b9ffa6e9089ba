// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types published on the [`crate::event_bus::EventBus`] (spec.md §3).

use crate::instance::{InstanceId, JobInstance};
use crate::state::ExecutionState;
use crate::tail::Stream;
use serde::{Deserialize, Serialize};

/// Tagged event published on every state transition and captured output line.
///
/// Serializes as `{"event_type": "state_changed", ...}` / `{"event_type":
/// "output_line", ...}` for remote (REST/wire) consumers (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum Event {
    #[serde(rename = "state_changed")]
    StateChanged {
        instance: Box<JobInstance>,
        from: ExecutionState,
        to: ExecutionState,
        at_epoch_ms: u64,
    },

    #[serde(rename = "output_line")]
    OutputLine { instance_id: InstanceId, stream: Stream, text: String, at_epoch_ms: u64 },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::StateChanged { .. } => "state_changed",
            Event::OutputLine { .. } => "output_line",
        }
    }

    pub fn instance_id(&self) -> &InstanceId {
        match self {
            Event::StateChanged { instance, .. } => &instance.instance_id,
            Event::OutputLine { instance_id, .. } => instance_id,
        }
    }

    pub fn is_terminal_state_change(&self) -> bool {
        matches!(self, Event::StateChanged { to, .. } if to.is_terminal())
    }

    pub fn log_summary(&self) -> String {
        match self {
            Event::StateChanged { instance, from, to, .. } => {
                format!("instance={} {from}->{to}", instance.instance_id)
            }
            Event::OutputLine { instance_id, stream, text, .. } => {
                format!("instance={instance_id} {stream:?} {text}")
            }
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
