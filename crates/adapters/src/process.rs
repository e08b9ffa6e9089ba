// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process spawning and signal delivery (spec.md §4.2).

use async_trait::async_trait;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn child process: {0}")]
    SpawnFailure(String),
    #[error("failed to signal process group {0}: {1}")]
    SignalFailure(i32, #[source] nix::errno::Errno),
    #[error("failed to wait on child process: {0}")]
    WaitFailure(String),
}

/// What termination the caller asked for, which signal corresponds to it on
/// this platform (spec.md §4.2: "the platform's graceful-termination
/// signal").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Stop,
    Interrupt,
}

impl StopKind {
    fn signal(self) -> Signal {
        match self {
            StopKind::Stop => Signal::SIGTERM,
            StopKind::Interrupt => Signal::SIGINT,
        }
    }
}

/// Send the platform graceful-termination signal to a process group,
/// addressed by the leader's pid (which equals the pgid, since children are
/// spawned with `process_group(0)`).
///
/// Exposed standalone so a caller that has already moved the owning
/// [`ProcessHandle`] into an `await_exit` future can still signal it, by
/// having recorded the pid beforehand.
pub fn signal_pid(pid: u32, kind: StopKind) -> Result<(), ProcessError> {
    let pgid = Pid::from_raw(pid as i32);
    match killpg(pgid, kind.signal()) {
        Ok(()) => Ok(()),
        // Already gone: the caller's subsequent `await_exit` will observe this.
        Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(ProcessError::SignalFailure(pgid.as_raw(), e)),
    }
}

/// A spawned child, its process group, and the two piped output streams
/// ready for an [`crate::output::OutputPump`] to drain.
pub struct ProcessHandle {
    child: Child,
    pgid: Pid,
    pub stdout: Option<tokio::process::ChildStdout>,
    pub stderr: Option<tokio::process::ChildStderr>,
}

impl ProcessHandle {
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Take the output pipes for an [`crate::output::OutputPump`], leaving
    /// the handle itself free to move into `await_exit`.
    pub fn take_io(&mut self) -> (tokio::process::ChildStdout, tokio::process::ChildStderr) {
        (self.stdout.take().expect("stdout already taken"), self.stderr.take().expect("stderr already taken"))
    }
}

/// Spawns children, signals their process groups, and awaits exit.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn start(&self, command: &str, argv: &[String]) -> Result<ProcessHandle, ProcessError>;

    /// Send the platform graceful-termination signal to the whole group.
    fn signal(&self, handle: &ProcessHandle, kind: StopKind) -> Result<(), ProcessError>;

    /// Block until the child exits. The supervisor never forces a kill for
    /// an unresponsive child (spec.md §4.2 orphan policy); this awaits
    /// indefinitely.
    async fn await_exit(&self, handle: ProcessHandle) -> Result<i32, ProcessError>;
}

/// [`ProcessRunner`] backed by `tokio::process`, signalling via the child's
/// own process group so descendants are reachable too.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixProcessRunner;

#[async_trait]
impl ProcessRunner for UnixProcessRunner {
    async fn start(&self, command: &str, argv: &[String]) -> Result<ProcessHandle, ProcessError> {
        let mut cmd = Command::new(command);
        cmd.args(argv);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(false);
        // New process group (pgid = own pid) so stop/interrupt can signal
        // the whole tree with killpg instead of just the immediate child.
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| ProcessError::SpawnFailure(e.to_string()))?;
        let pid = child.id().ok_or_else(|| ProcessError::SpawnFailure("child has no pid".into()))?;
        let stdout = child.stdout.take().ok_or_else(|| ProcessError::SpawnFailure("no stdout pipe".into()))?;
        let stderr = child.stderr.take().ok_or_else(|| ProcessError::SpawnFailure("no stderr pipe".into()))?;
        Ok(ProcessHandle { child, pgid: Pid::from_raw(pid as i32), stdout: Some(stdout), stderr: Some(stderr) })
    }

    fn signal(&self, handle: &ProcessHandle, kind: StopKind) -> Result<(), ProcessError> {
        signal_pid(handle.pgid.as_raw() as u32, kind)
    }

    async fn await_exit(&self, mut handle: ProcessHandle) -> Result<i32, ProcessError> {
        let status =
            handle.child.wait().await.map_err(|e| ProcessError::WaitFailure(e.to_string()))?;
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
