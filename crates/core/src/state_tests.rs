// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    none_to_created = { ExecutionState::None, ExecutionState::Created, true },
    created_to_pending = { ExecutionState::Created, ExecutionState::Pending, true },
    created_to_disabled = { ExecutionState::Created, ExecutionState::Disabled, true },
    created_to_running = { ExecutionState::Created, ExecutionState::Running, true },
    created_to_completed_illegal = { ExecutionState::Created, ExecutionState::Completed, false },
    pending_to_running = { ExecutionState::Pending, ExecutionState::Running, true },
    pending_to_stopped = { ExecutionState::Pending, ExecutionState::Stopped, true },
    pending_to_interrupted = { ExecutionState::Pending, ExecutionState::Interrupted, true },
    pending_to_failed_illegal = { ExecutionState::Pending, ExecutionState::Failed, false },
    running_to_completed = { ExecutionState::Running, ExecutionState::Completed, true },
    running_to_stopped = { ExecutionState::Running, ExecutionState::Stopped, true },
    running_to_interrupted = { ExecutionState::Running, ExecutionState::Interrupted, true },
    running_to_failed = { ExecutionState::Running, ExecutionState::Failed, true },
    running_to_pending_illegal = { ExecutionState::Running, ExecutionState::Pending, false },
    completed_to_anything_illegal = { ExecutionState::Completed, ExecutionState::Running, false },
    completed_self_illegal = { ExecutionState::Completed, ExecutionState::Completed, false },
    created_self_idempotent = { ExecutionState::Created, ExecutionState::Created, true },
)]
fn transition_graph(from: ExecutionState, to: ExecutionState, expected: bool) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[test]
fn terminal_bit() {
    for s in [
        ExecutionState::Disabled,
        ExecutionState::Completed,
        ExecutionState::Stopped,
        ExecutionState::Interrupted,
        ExecutionState::Failed,
    ] {
        assert!(s.is_terminal(), "{s} should be terminal");
    }
    for s in [ExecutionState::None, ExecutionState::Created, ExecutionState::Pending, ExecutionState::Running] {
        assert!(!s.is_terminal(), "{s} should not be terminal");
    }
}

#[test]
fn failure_bit() {
    assert!(ExecutionState::Interrupted.is_failure());
    assert!(ExecutionState::Failed.is_failure());
    assert!(!ExecutionState::Completed.is_failure());
    assert!(!ExecutionState::Stopped.is_failure());
    assert!(!ExecutionState::Disabled.is_failure());
}

#[test]
fn terminals_have_no_outgoing_edges() {
    let terminals = [
        ExecutionState::Disabled,
        ExecutionState::Completed,
        ExecutionState::Stopped,
        ExecutionState::Interrupted,
        ExecutionState::Failed,
    ];
    let all = [
        ExecutionState::None,
        ExecutionState::Created,
        ExecutionState::Pending,
        ExecutionState::Disabled,
        ExecutionState::Running,
        ExecutionState::Completed,
        ExecutionState::Stopped,
        ExecutionState::Interrupted,
        ExecutionState::Failed,
    ];
    for t in terminals {
        for to in all {
            assert!(!t.can_transition_to(to), "{t} -> {to} should be illegal");
        }
    }
}

#[test]
fn display_matches_lowercase_name() {
    assert_eq!(ExecutionState::Running.to_string(), "running");
    assert_eq!(ExecutionState::Interrupted.to_string(), "interrupted");
}
