// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

/// Render a value in the specified format
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Toml => toml::to_string_pretty(value)?,
    };
    Ok(text)
}

/// Print a value in the specified format
pub fn print<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let text = render(value, format)?;
    println!("{}", text.trim_end());
    Ok(())
}
