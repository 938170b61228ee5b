// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Discover tests and build commands that run only the selected ones
#[derive(Parser)]
#[command(name = "tirun")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "TIRUN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every test in files matched by the test globs
    Discover(DiscoverArgs),
    /// List top-level packages that contain tests
    Packages(RunnerArgs),
    /// Print the command that runs a selection
    Command(CommandArgs),
    /// Build and execute the command for a selection
    Run(RunArgs),
}

/// Runner selection shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct RunnerArgs {
    /// Language whose runner to use
    #[arg(short, long, default_value = "python")]
    pub lang: String,

    /// Test framework (default: from config, else the language default)
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Project root; globs and package paths are relative to it
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Instrumentation agent binary (overrides config)
    #[arg(long, value_name = "PATH")]
    pub agent: Option<String>,
}

#[derive(clap::Args)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub runner: RunnerArgs,

    /// Test glob (repeatable; default: configured test_globs)
    #[arg(short, long = "glob", value_name = "GLOB")]
    pub globs: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct CommandArgs {
    #[command(flatten)]
    pub runner: RunnerArgs,

    /// JSON file with the selected tests (`-` for stdin)
    #[arg(short, long, value_name = "FILE")]
    pub tests: Option<PathBuf>,

    /// Arguments appended verbatim to the test command
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub user_args: String,

    /// Instrumentation agent config file, relative to the project root
    #[arg(long, default_value = "", value_name = "PATH")]
    pub agent_config: String,

    /// Run without the instrumentation agent
    #[arg(long)]
    pub ignore_instrumentation: bool,

    /// Run the full suite, ignoring the selection
    #[arg(long)]
    pub run_all: bool,
}

#[derive(clap::Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub command: CommandArgs,

    /// Kill the run after this long (e.g., 30s, 10m)
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<std::time::Duration>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One test per line
    Text,
    #[default]
    Json,
}

fn parse_timeout(s: &str) -> Result<std::time::Duration, String> {
    crate::config::parse_duration(s)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
