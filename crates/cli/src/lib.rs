// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Selective test execution.
//!
//! Runners discover the tests of one framework and turn an impact-selected
//! subset into a single command that runs exactly those tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod fs;
pub mod host;
pub mod runners;
pub mod walker;

pub use cli::{Cli, Command, CommandArgs, DiscoverArgs, OutputFormat, RunArgs, RunnerArgs};
pub use config::Config;
pub use error::{Error, ExitCode, Result};
pub use exec::{CancelToken, ExecOptions, ExecOutput, ProcessFactory, ShellProcessFactory};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use runners::{
    Capabilities, CommandRequest, RunOutcome, RunSummary, RunnableTest, Runner, RunnerSettings,
    TestCommand, TestGlob, create_runner,
};
pub use walker::{FileWalker, WalkStats, WalkedFile, WalkerConfig};

#[cfg(test)]
pub mod test_utils;
