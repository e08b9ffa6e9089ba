// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C9 Supervisor: registry of live job instances, orchestrating
//! DisabledRegistry, LatchRegistry, ProcessRunner, and HistoryStore
//! (spec.md §4.8).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use taro_adapters::{signal_pid, OutputPump, ProcessRunner, StopKind};
use taro_core::{
    Clock, CoreError, CoreResult, DropPolicy, Event, EventBus, EventFilter, ExecutionState,
    InstanceId, InstanceIdGen, InstanceStateMachine, JobId, JobInstance, JobSpec, LatchRegistry,
    Subscription, SystemClock, TailBuffer, TailLine, TerminationIntent,
};
use taro_storage::{DisabledRecord, DisabledRegistry, HistoryQuery, HistoryRecord, HistoryStore, PatternKind};

/// What the caller asked the Supervisor to admit (spec.md §4.8 `execute`).
#[derive(Debug, Clone)]
pub struct ExecuteSpec {
    pub job_id: String,
    pub command: String,
    pub argv: Vec<String>,
    pub pending_latch: Option<String>,
    pub bypass_output: bool,
}

/// Selects one instance, or every live instance of a job.
#[derive(Debug, Clone)]
pub enum Selector {
    Instance(InstanceId),
    Job(String),
}

struct LiveInstance {
    state_machine: Arc<InstanceStateMachine>,
    tail: TailBuffer,
    bypass_output: bool,
    /// Set once the child has been spawned; used to signal it without
    /// holding the `ProcessHandle`, which is owned by the task awaiting
    /// exit (spec.md §4.2).
    pid: Mutex<Option<u32>>,
}

/// Registry of live job instances; owns DisabledRegistry, LatchRegistry,
/// ProcessRunner, HistoryStore and serves `execute`/`ps`/`stop`/`release`/
/// `wait` (spec.md §4.8).
pub struct Supervisor {
    clock: SystemClock,
    bus: EventBus,
    latches: Arc<LatchRegistry>,
    disabled: Option<DisabledRegistry>,
    history: Option<HistoryStore>,
    runner: Arc<dyn ProcessRunner>,
    id_gen: InstanceIdGen,
    tail_capacity: usize,
    live: Mutex<HashMap<InstanceId, Arc<LiveInstance>>>,
}

impl Supervisor {
    pub fn new(
        bus: EventBus,
        runner: Arc<dyn ProcessRunner>,
        disabled: Option<DisabledRegistry>,
        history: Option<HistoryStore>,
        tail_capacity: usize,
    ) -> Self {
        Self {
            clock: SystemClock,
            bus,
            latches: Arc::new(LatchRegistry::new()),
            disabled,
            history,
            runner,
            id_gen: InstanceIdGen::new(),
            tail_capacity,
            live: Mutex::new(HashMap::new()),
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Admit a new job instance (spec.md §4.8).
    pub async fn execute(&self, spec: ExecuteSpec) -> CoreResult<InstanceId> {
        let job_id = JobId::new(spec.job_id.clone());
        let instance_id = self.id_gen.next(&job_id);
        let job_spec = JobSpec {
            job_id: job_id.clone(),
            command: spec.command.clone(),
            argv: spec.argv.clone(),
            pending_latch: spec.pending_latch.clone(),
            bypass_output: spec.bypass_output,
        };
        let instance = JobInstance::new(instance_id.clone(), &job_spec, &self.clock);
        let state_machine = Arc::new(InstanceStateMachine::new(instance, self.bus.clone()));
        state_machine.transition(ExecutionState::Created, &self.clock)?;

        let tail = TailBuffer::new(self.tail_capacity);
        let live = Arc::new(LiveInstance {
            state_machine: state_machine.clone(),
            tail: tail.clone(),
            bypass_output: spec.bypass_output,
            pid: Mutex::new(None),
        });
        self.live.lock().insert(instance_id.clone(), live);

        let disabled = match &self.disabled {
            Some(registry) => {
                registry.is_disabled(job_id.as_str()).map_err(|e| CoreError::PersistenceFailure(e.to_string()))?
            }
            None => false,
        };
        if disabled {
            state_machine.transition(ExecutionState::Disabled, &self.clock)?;
            self.record_terminal(&instance_id).await;
            return Ok(instance_id);
        }

        if let Some(latch) = &spec.pending_latch {
            state_machine.transition(ExecutionState::Pending, &self.clock)?;
            self.latches.register(latch.clone(), instance_id.clone());
            return Ok(instance_id);
        }

        self.spawn_and_track(instance_id.clone(), spec.command, spec.argv);
        Ok(instance_id)
    }

    /// Transition a live instance to `Running`, spawn its child, and drive
    /// it to a terminal state once it exits. Runs detached: callers observe
    /// progress via the EventBus, not this future (spec.md §4.2).
    fn spawn_and_track(&self, instance_id: InstanceId, command: String, argv: Vec<String>) {
        let live = match self.live.lock().get(&instance_id).cloned() {
            Some(live) => live,
            None => return,
        };
        if let Err(e) = live.state_machine.transition(ExecutionState::Running, &self.clock) {
            tracing::warn!(%instance_id, error = %e, "illegal transition to running");
            return;
        }

        let bus = self.bus.clone();
        let clock = self.clock.clone();
        let runner = self.runner.clone();
        let history = self.history.clone();
        let state_machine = live.state_machine.clone();
        let tail = live.tail.clone();
        let bypass_output = live.bypass_output;

        tokio::spawn(async move {
            let mut handle = match runner.start(&command, &argv).await {
                Ok(handle) => handle,
                Err(e) => {
                    let _ = state_machine.fail(e.to_string(), &clock);
                    record_terminal(&history, &state_machine, &tail).await;
                    return;
                }
            };
            *live.pid.lock() = handle.pid();

            let pump = (!bypass_output).then(|| {
                let (stdout, stderr) = handle.take_io();
                OutputPump::spawn(instance_id.clone(), stdout, stderr, tail.clone(), bus.clone(), clock)
            });

            let exit_code = match runner.await_exit(handle).await {
                Ok(code) => code,
                Err(e) => {
                    if let Some(pump) = pump {
                        pump.drain().await;
                    }
                    tail.close();
                    let _ = state_machine.fail(e.to_string(), &clock);
                    record_terminal(&history, &state_machine, &tail).await;
                    return;
                }
            };
            if let Some(pump) = pump {
                pump.drain().await;
            }
            tail.close();

            match state_machine.snapshot().termination_intent {
                TerminationIntent::Stop => {
                    let _ = state_machine.transition(ExecutionState::Stopped, &clock);
                }
                TerminationIntent::Interrupt => {
                    let _ = state_machine.transition(ExecutionState::Interrupted, &clock);
                }
                TerminationIntent::None => {
                    let _ = state_machine.complete(exit_code, &clock);
                }
            }
            record_terminal(&history, &state_machine, &tail).await;
        });
    }

    async fn record_terminal(&self, instance_id: &InstanceId) {
        if let Some(live) = self.live.lock().get(instance_id).cloned() {
            record_terminal(&self.history, &live.state_machine, &live.tail).await;
        }
    }

    /// Live instance snapshots (spec.md §4.8 `ps`).
    pub fn ps(&self) -> Vec<JobInstance> {
        self.live.lock().values().map(|live| live.state_machine.snapshot()).collect()
    }

    fn resolve(&self, selector: &Selector) -> Vec<(InstanceId, Arc<LiveInstance>)> {
        let live = self.live.lock();
        match selector {
            Selector::Instance(id) => live.get(id).map(|l| (id.clone(), l.clone())).into_iter().collect(),
            Selector::Job(job_id) => live
                .iter()
                .filter(|(_, l)| l.state_machine.snapshot().job_id.as_str() == job_id.as_str())
                .map(|(id, l)| (id.clone(), l.clone()))
                .collect(),
        }
    }

    /// Request STOPPED (spec.md §4.8 `stop`). Fire-and-forget: completion is
    /// observed via events.
    pub async fn stop(&self, selector: Selector) -> CoreResult<()> {
        self.request_termination(selector, TerminationIntent::Stop).await
    }

    /// Request INTERRUPTED (spec.md §4.8 `interrupt`).
    pub async fn interrupt(&self, selector: Selector) -> CoreResult<()> {
        self.request_termination(selector, TerminationIntent::Interrupt).await
    }

    async fn request_termination(&self, selector: Selector, intent: TerminationIntent) -> CoreResult<()> {
        let targets = self.resolve(&selector);
        if targets.is_empty() {
            return match selector {
                Selector::Instance(id) => Err(CoreError::UnknownInstance(id)),
                Selector::Job(_) => Ok(()),
            };
        }
        for (instance_id, live) in targets {
            let state = live.state_machine.state();
            if state.is_terminal() {
                continue;
            }
            let effective = live.state_machine.request_termination(intent);
            match state {
                ExecutionState::Pending => {
                    self.latches.cancel(&instance_id);
                    let to = match effective {
                        TerminationIntent::Stop => ExecutionState::Stopped,
                        TerminationIntent::Interrupt => ExecutionState::Interrupted,
                        TerminationIntent::None => continue,
                    };
                    let _ = live.state_machine.transition(to, &self.clock);
                    self.record_terminal(&instance_id).await;
                }
                ExecutionState::Running => {
                    if let Some(pid) = *live.pid.lock() {
                        let kind = match effective {
                            TerminationIntent::Stop => StopKind::Stop,
                            TerminationIntent::Interrupt => StopKind::Interrupt,
                            TerminationIntent::None => continue,
                        };
                        let _ = signal_pid(pid, kind);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Interrupt every live instance and wait for each to reach a terminal
    /// state before returning (spec.md §4.2: supervisor-level signal
    /// inheritance on SIGTERM/SIGINT).
    pub async fn shutdown(&self) {
        let ids: Vec<InstanceId> = self.live.lock().keys().cloned().collect();
        for id in ids {
            let _ = self.interrupt(Selector::Instance(id)).await;
        }
        loop {
            let draining = self.live.lock().values().any(|live| !live.state_machine.state().is_terminal());
            if !draining {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Release every waiter on `latch` (spec.md §4.5 `release`).
    pub fn release(&self, latch: &str) -> usize {
        let waiters = self.latches.release(latch);
        let count = waiters.len();
        for instance_id in waiters {
            if let Some(live) = self.live.lock().get(&instance_id).cloned() {
                let snapshot = live.state_machine.snapshot();
                self.spawn_and_track(instance_id, snapshot.command.clone(), snapshot.argv.clone());
            }
        }
        count
    }

    /// Block until an event matching `predicate` is observed, or `timeout`
    /// elapses (spec.md §4.8 `wait`).
    pub async fn wait(
        &self,
        predicate: impl Fn(&Event) -> bool + Send + 'static,
        timeout: Option<Duration>,
    ) -> CoreResult<Event> {
        let sub = self.bus.subscribe(EventFilter::All, 256, DropPolicy::DropOldest);
        let recv = async {
            loop {
                let event = sub.recv().await;
                if predicate(&event) {
                    return event;
                }
            }
        };
        match timeout {
            Some(duration) => tokio::time::timeout(duration, recv).await.map_err(|_| CoreError::Timeout),
            None => Ok(recv.await),
        }
    }

    pub fn subscribe(&self, filter: EventFilter, capacity: usize, policy: DropPolicy) -> Subscription {
        self.bus.subscribe(filter, capacity, policy)
    }

    pub fn tail_snapshot(&self, instance_id: &InstanceId) -> Option<Vec<TailLine>> {
        self.live.lock().get(instance_id).map(|live| live.tail.snapshot())
    }

    pub fn tail_follow(&self, instance_id: &InstanceId) -> Option<(tokio::sync::broadcast::Receiver<TailLine>, TailBuffer)> {
        self.live.lock().get(instance_id).map(|live| (live.tail.follow(), live.tail.clone()))
    }

    /// Query terminated instances (spec.md §4.9 `history`).
    pub fn history(&self, query: &HistoryQuery) -> CoreResult<Vec<HistoryRecord>> {
        match &self.history {
            Some(store) => store.query(query).map_err(|e| CoreError::PersistenceFailure(e.to_string())),
            None => Err(CoreError::PersistenceRequired),
        }
    }

    /// Add patterns to the disabled-job admission filter (spec.md §4.6).
    pub fn disable(&self, patterns: &[String], kind: PatternKind, by: Option<&str>) -> CoreResult<()> {
        match &self.disabled {
            Some(registry) => registry
                .disable(patterns, kind, by, self.clock.epoch_ms() as i64)
                .map_err(|e| CoreError::PersistenceFailure(e.to_string())),
            None => Err(CoreError::PersistenceRequired),
        }
    }

    pub fn enable(&self, patterns: &[String]) -> CoreResult<usize> {
        match &self.disabled {
            Some(registry) => registry.enable(patterns).map_err(|e| CoreError::PersistenceFailure(e.to_string())),
            None => Err(CoreError::PersistenceRequired),
        }
    }

    pub fn list_disabled(&self) -> CoreResult<Vec<DisabledRecord>> {
        match &self.disabled {
            Some(registry) => registry.list().map_err(|e| CoreError::PersistenceFailure(e.to_string())),
            None => Err(CoreError::PersistenceRequired),
        }
    }
}

async fn record_terminal(history: &Option<HistoryStore>, state_machine: &InstanceStateMachine, tail: &TailBuffer) {
    let snapshot = state_machine.snapshot();
    if !snapshot.is_terminal() {
        return;
    }
    if let Some(store) = history {
        let tail_text = tail.snapshot().into_iter().map(|line| line.text).collect::<Vec<_>>().join("\n");
        if let Err(e) = store.record(&snapshot, &tail_text) {
            tracing::warn!(instance = %snapshot.instance_id, error = %e, "failed to persist history record");
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
