// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as JSON, or run `render` for human-readable text
/// (teacher convention: every command supports `--format json`).
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    value: &T,
    render: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Text => render(),
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
