// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `keylock config` - Print the effective configuration

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use keylock_core::KeylockConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn config(args: ConfigArgs, config: KeylockConfig) -> Result<()> {
    output::print(&config, args.format)
}
