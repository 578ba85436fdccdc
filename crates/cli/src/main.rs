// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! keylock - run commands under a named distributed lock

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod backend;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, run};
use keylock_core::KeylockConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::error::KeylockError;

#[derive(Parser)]
#[command(
    name = "keylock",
    version,
    about = "Keylock - run commands under a named lock"
)]
struct Cli {
    /// Config file (TOML)
    #[arg(long, short = 'c', global = true, env = "KEYLOCK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command while holding a lock
    Run(run::RunArgs),
    /// Print the effective configuration
    Config(config::ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<KeylockError>() {
                Some(err) => eprint!("{}", err),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::from(error::exit_code(&e))
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run::run(args, config),
        Commands::Config(args) => {
            config::config(args, config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<KeylockConfig> {
    match path {
        Some(path) => KeylockConfig::load(path)
            .map_err(|e| KeylockError::config(path, e).into()),
        None => Ok(KeylockConfig::default()),
    }
}

/// Logs go to stderr; stdout belongs to the wrapped command
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
