// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::instance::{InstanceIdGen, JobSpec};

fn sample_instance() -> JobInstance {
    let clock = FakeClock::new();
    let spec = JobSpec::new("build", "echo", vec![]);
    let gen = InstanceIdGen::new();
    JobInstance::new(gen.next(&spec.job_id), &spec, &clock)
}

#[test]
fn state_changed_reports_terminal() {
    let event = Event::StateChanged {
        instance: Box::new(sample_instance()),
        from: ExecutionState::Running,
        to: ExecutionState::Completed,
        at_epoch_ms: 1,
    };
    assert!(event.is_terminal_state_change());
    assert_eq!(event.name(), "state_changed");
}

#[test]
fn non_terminal_state_change_reports_false() {
    let event = Event::StateChanged {
        instance: Box::new(sample_instance()),
        from: ExecutionState::Created,
        to: ExecutionState::Running,
        at_epoch_ms: 1,
    };
    assert!(!event.is_terminal_state_change());
}

#[test]
fn output_line_instance_id() {
    let instance = sample_instance();
    let event = Event::OutputLine {
        instance_id: instance.instance_id.clone(),
        stream: Stream::Stdout,
        text: "hi".into(),
        at_epoch_ms: 1,
    };
    assert_eq!(event.instance_id(), &instance.instance_id);
    assert_eq!(event.name(), "output_line");
}

#[test]
fn wire_tag_is_snake_case() {
    let event = Event::OutputLine {
        instance_id: sample_instance().instance_id,
        stream: Stream::Stderr,
        text: "x".into(),
        at_epoch_ms: 1,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event_type"], "output_line");
}
