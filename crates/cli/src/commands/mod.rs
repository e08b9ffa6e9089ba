// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `taro` subcommand definitions and dispatch (spec.md §6).

mod daemon;
mod disabled;
mod history;
mod job;
mod stream;

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use taro_daemon::Config;

#[derive(Parser)]
#[command(name = "taro", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for commands that print structured data.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Admit and run a job instance.
    Exec(job::ExecArgs),
    /// List live instances.
    Ps,
    /// Request STOPPED for an instance or every instance of a job.
    Stop { selector: String },
    /// Request INTERRUPTED for an instance or every instance of a job.
    Interrupt { selector: String },
    /// Release every PENDING waiter on a latch.
    Release { latch: String },
    /// Stream StateChanged events until interrupted.
    Listen,
    /// Exit 0 once any instance enters the given state.
    Wait {
        state: String,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Print an instance's tail buffer.
    Tail {
        instance: String,
        /// Keep streaming new lines until the instance reaches terminal.
        #[arg(short, long)]
        follow: bool,
    },
    /// Print history records.
    #[command(alias = "hist")]
    History(history::HistoryArgs),
    /// Add disabled-job patterns (requires persistence).
    Disable {
        #[arg(long)]
        regex: bool,
        patterns: Vec<String>,
    },
    /// Remove disabled-job patterns.
    Enable { patterns: Vec<String> },
    /// List disabled-job patterns.
    ListDisabled,
    /// Manage the `tarod` daemon process itself.
    Daemon(daemon::DaemonArgs),
}

/// Dispatch a parsed command. Returns the process exit code (spec.md §6).
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load()?;
    match cli.command {
        Command::Exec(args) => job::exec(&config, args, cli.format).await,
        Command::Ps => job::ps(&config, cli.format).await,
        Command::Stop { selector } => job::stop(&config, &selector).await,
        Command::Interrupt { selector } => job::interrupt(&config, &selector).await,
        Command::Release { latch } => job::release(&config, &latch, cli.format).await,
        Command::Listen => stream::listen(&config).await,
        Command::Wait { state, timeout_ms } => job::wait(&config, &state, timeout_ms).await,
        Command::Tail { instance, follow } => stream::tail(&config, &instance, follow).await,
        Command::History(args) => history::history(&config, args, cli.format).await,
        Command::Disable { regex, patterns } => disabled::disable(&config, patterns, regex).await,
        Command::Enable { patterns } => disabled::enable(&config, patterns, cli.format).await,
        Command::ListDisabled => disabled::list_disabled(&config, cli.format).await,
        Command::Daemon(args) => daemon::daemon(&config, args, cli.format).await,
    }
}
