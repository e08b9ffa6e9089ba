// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stateful wrapper driving one [`JobInstance`] through its transition graph
//! and publishing exactly one [`Event::StateChanged`] per real transition
//! (spec.md §4.1).

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::event::Event;
use crate::event_bus::EventBus;
use crate::instance::{JobInstance, TerminationIntent};
use crate::state::ExecutionState;

/// Owns one instance's mutable state and serializes transitions against it.
///
/// Held behind an `Arc` by the supervisor; every caller that needs to read
/// or move an instance's state goes through this type rather than touching
/// [`JobInstance`] fields directly.
pub struct InstanceStateMachine {
    instance: parking_lot::Mutex<JobInstance>,
    bus: EventBus,
}

impl InstanceStateMachine {
    pub fn new(instance: JobInstance, bus: EventBus) -> Self {
        Self { instance: parking_lot::Mutex::new(instance), bus }
    }

    /// A consistent snapshot of the instance. Cheap; clones the record.
    pub fn snapshot(&self) -> JobInstance {
        self.instance.lock().clone()
    }

    pub fn state(&self) -> ExecutionState {
        self.instance.lock().state
    }

    /// Record a termination request without transitioning state (the
    /// supervisor may call this while a `Running` instance's process is
    /// still being awaited elsewhere). First request wins (spec.md §4.1
    /// tie-break); returns the effective intent after the request.
    pub fn request_termination(&self, intent: TerminationIntent) -> TerminationIntent {
        let mut instance = self.instance.lock();
        instance.termination_intent.request(intent);
        instance.termination_intent
    }

    /// Attempt to move the instance to `to`.
    ///
    /// Returns `Ok(true)` if a real transition happened (and exactly one
    /// [`Event::StateChanged`] was published), `Ok(false)` if `to` matches
    /// the current state (a legal no-op that publishes nothing), or
    /// `Err(CoreError::IllegalTransition)` if the edge doesn't exist in the
    /// graph.
    pub fn transition(&self, to: ExecutionState, clock: &impl Clock) -> CoreResult<bool> {
        let mut instance = self.instance.lock();
        let from = instance.state;
        if !from.can_transition_to(to) {
            return Err(CoreError::IllegalTransition { instance: instance.instance_id.clone(), from, to });
        }
        if from == to {
            return Ok(false);
        }
        let at_epoch_ms = clock.epoch_ms();
        instance.enter_state(to, at_epoch_ms);
        let snapshot = instance.clone();
        // Drop the lock before publishing so a slow/blocked subscriber can
        // never hold up another thread's access to this instance.
        drop(instance);
        self.bus.publish(Event::StateChanged { instance: Box::new(snapshot), from, to, at_epoch_ms });
        Ok(true)
    }

    /// Record a terminal failure with a message, transitioning to `Failed`.
    pub fn fail(&self, message: impl Into<String>, clock: &impl Clock) -> CoreResult<bool> {
        {
            let mut instance = self.instance.lock();
            instance.error = Some(message.into());
        }
        self.transition(ExecutionState::Failed, clock)
    }

    /// Record the child's exit code alongside its terminal state transition.
    pub fn complete(&self, exit_code: i32, clock: &impl Clock) -> CoreResult<bool> {
        let to = if exit_code == 0 { ExecutionState::Completed } else { ExecutionState::Failed };
        {
            let mut instance = self.instance.lock();
            instance.exit_code = Some(exit_code);
            if to == ExecutionState::Failed {
                instance.error = Some(format!("exit code {exit_code}"));
            }
        }
        self.transition(to, clock)
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
