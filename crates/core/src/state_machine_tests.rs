// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::event_bus::{DropPolicy, EventFilter};
use crate::instance::{InstanceIdGen, JobSpec};

fn machine() -> (InstanceStateMachine, EventBus, FakeClock) {
    let clock = FakeClock::new();
    let bus = EventBus::new();
    let spec = JobSpec::new("build", "echo", vec![]);
    let gen = InstanceIdGen::new();
    let instance = JobInstance::new(gen.next(&spec.job_id), &spec, &clock);
    (InstanceStateMachine::new(instance, bus.clone()), bus, clock)
}

#[test]
fn legal_transition_updates_state_and_publishes_once() {
    let (machine, bus, clock) = machine();
    let sub = bus.subscribe(EventFilter::All, 10, DropPolicy::DropNewest);
    assert!(machine.transition(ExecutionState::Created, &clock).unwrap());
    assert_eq!(machine.state(), ExecutionState::Created);
    assert!(sub.try_recv().is_some());
    assert!(sub.try_recv().is_none());
}

#[test]
fn illegal_transition_is_rejected_and_does_not_publish() {
    let (machine, bus, clock) = machine();
    let sub = bus.subscribe(EventFilter::All, 10, DropPolicy::DropNewest);
    let err = machine.transition(ExecutionState::Running, &clock).unwrap_err();
    assert!(matches!(err, CoreError::IllegalTransition { .. }));
    assert_eq!(machine.state(), ExecutionState::None);
    assert!(sub.try_recv().is_none());
}

#[test]
fn repeating_current_state_is_a_no_op() {
    let (machine, bus, clock) = machine();
    machine.transition(ExecutionState::Created, &clock).unwrap();
    let sub = bus.subscribe(EventFilter::All, 10, DropPolicy::DropNewest);
    let changed = machine.transition(ExecutionState::Created, &clock).unwrap();
    assert!(!changed);
    assert!(sub.try_recv().is_none());
}

#[test]
fn terminal_state_rejects_even_self_transition() {
    let (machine, _bus, clock) = machine();
    machine.transition(ExecutionState::Created, &clock).unwrap();
    machine.transition(ExecutionState::Running, &clock).unwrap();
    machine.complete(0, &clock).unwrap();
    assert_eq!(machine.state(), ExecutionState::Completed);
    let err = machine.transition(ExecutionState::Completed, &clock).unwrap_err();
    assert!(matches!(err, CoreError::IllegalTransition { .. }));
}

#[test]
fn complete_with_nonzero_exit_transitions_to_failed() {
    let (machine, _bus, clock) = machine();
    machine.transition(ExecutionState::Created, &clock).unwrap();
    machine.transition(ExecutionState::Running, &clock).unwrap();
    machine.complete(1, &clock).unwrap();
    let snapshot = machine.snapshot();
    assert_eq!(snapshot.state, ExecutionState::Failed);
    assert_eq!(snapshot.exit_code, Some(1));
    assert_eq!(snapshot.error.as_deref(), Some("exit code 1"));
}

#[test]
fn request_termination_first_call_wins() {
    let (machine, _bus, _clock) = machine();
    use crate::instance::TerminationIntent;
    assert_eq!(machine.request_termination(TerminationIntent::Stop), TerminationIntent::Stop);
    assert_eq!(machine.request_termination(TerminationIntent::Interrupt), TerminationIntent::Stop);
}

#[test]
fn fail_records_error_message() {
    let (machine, _bus, clock) = machine();
    machine.transition(ExecutionState::Created, &clock).unwrap();
    machine.transition(ExecutionState::Running, &clock).unwrap();
    machine.fail("spawn exploded", &clock).unwrap();
    let snapshot = machine.snapshot();
    assert_eq!(snapshot.state, ExecutionState::Failed);
    assert_eq!(snapshot.error.as_deref(), Some("spawn exploded"));
}
