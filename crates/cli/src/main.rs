// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use clap::{CommandFactory, FromArgMatches};
use commands::Cli;
use exit_error::ExitError;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let command = Cli::command().styles(color::styles());
    let matches = command.get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let code = match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(exit_error) = e.downcast_ref::<ExitError>() {
                eprintln!("{}", exit_error.message);
                exit_error.code
            } else {
                eprintln!("error: {e:#}");
                1
            }
        }
    };

    std::process::exit(code);
}
