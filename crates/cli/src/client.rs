// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin socket client: dials `tarod`'s Unix socket and sends one
//! `Request`, or (for `listen`/`tail -f`) keeps the connection open and
//! yields a stream of `Response` frames.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use taro_daemon::Config;
use taro_wire::{read_framed, write_framed, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (socket not found at {0})")]
    NotRunning(PathBuf),
    #[error("could not reach daemon: {0}")]
    Unreachable(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("unexpected response from daemon: {0:?}")]
    UnexpectedResponse(Response),
}

impl ClientError {
    /// Whether this failure means "no daemon to talk to", distinct from a
    /// mid-conversation protocol break (spec.md §6 exit code 2).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::NotRunning(_) | ClientError::Unreachable(_))
    }
}

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    pub async fn connect(config: &Config) -> Result<Self, ClientError> {
        if !config.socket_path.exists() {
            return Err(ClientError::NotRunning(config.socket_path.clone()));
        }
        let stream = UnixStream::connect(&config.socket_path).await?;
        Ok(Self { stream })
    }

    /// Connect, spawning `tarod` in the background and retrying briefly if
    /// no daemon is currently listening.
    pub async fn connect_or_start(config: &Config) -> Result<Self, ClientError> {
        match Self::connect(config).await {
            Ok(client) => Ok(client),
            Err(ClientError::NotRunning(_)) => {
                spawn_daemon()?;
                for _ in 0..20 {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    if let Ok(client) = Self::connect(config).await {
                        return Ok(client);
                    }
                }
                Self::connect(config).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn send(mut self, request: &Request) -> Result<Response, ClientError> {
        write_framed(&mut self.stream, request).await?;
        Ok(read_framed(&mut self.stream).await?)
    }

    /// Consume the connection as a stream of frames, for `listen` and
    /// `tail -f` (spec.md §4.12: the connection stays open until the client
    /// disconnects or, for a following tail, the instance reaches terminal).
    pub async fn send_streaming(
        mut self,
        request: &Request,
        mut on_frame: impl FnMut(Response) -> bool,
    ) -> Result<(), ClientError> {
        write_framed(&mut self.stream, request).await?;
        loop {
            let response: Response = read_framed(&mut self.stream).await?;
            if !on_frame(response) {
                break;
            }
        }
        Ok(())
    }
}

fn spawn_daemon() -> Result<(), ClientError> {
    let exe = find_tarod_binary();
    std::process::Command::new(exe).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null()).spawn()?;
    Ok(())
}

fn find_tarod_binary() -> PathBuf {
    if let Some(dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(|d| d.to_path_buf())) {
        let sibling = dir.join("tarod");
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from("tarod")
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
