// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tirun CLI entry point.

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt};

use tirun::cli::{Cli, Command};
use tirun::error::ExitCode;

mod cmd_discover;
mod cmd_run;

fn init_logging() {
    let filter = EnvFilter::try_from_env("TIRUN_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("tirun: {}", e);
            match e.downcast_ref::<tirun::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::InternalError,
            }
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match &cli.command {
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(ExitCode::Success)
        }
        Some(Command::Discover(args)) => cmd_discover::discover(config, args),
        Some(Command::Packages(args)) => cmd_discover::packages(config, args),
        Some(Command::Command(args)) => cmd_run::command(config, args),
        Some(Command::Run(args)) => cmd_run::run(config, args),
    }
}
