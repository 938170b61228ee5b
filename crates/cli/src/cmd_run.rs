// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `tirun command` and `tirun run`.

use std::io::Write;
use std::path::Path;

use tirun::cli::{CommandArgs, RunArgs};
use tirun::error::ExitCode;
use tirun::exec::{CancelToken, ExecOptions};
use tirun::host::{Host, read_selection};
use tirun::runners::{CommandRequest, RunnableTest, TestCommand};

fn build(host: &Host, args: &CommandArgs) -> anyhow::Result<TestCommand> {
    let selected: Vec<RunnableTest> = match &args.tests {
        Some(path) => read_selection(path)?,
        None => Vec::new(),
    };
    let command = host.runner.build_command(&CommandRequest {
        selected: &selected,
        user_args: &args.user_args,
        agent_config_path: &args.agent_config,
        ignore_instrumentation: args.ignore_instrumentation,
        run_all: args.run_all,
    })?;
    Ok(command)
}

pub fn command(config: Option<&Path>, args: &CommandArgs) -> anyhow::Result<ExitCode> {
    let host = Host::open(config, &args.runner)?;
    let command = build(&host, args)?;
    command.write_artifacts()?;
    println!("{}", command);
    Ok(ExitCode::Success)
}

pub fn run(config: Option<&Path>, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let host = Host::open(config, &args.command.runner)?;
    let command = build(&host, &args.command)?;

    let options = ExecOptions {
        cwd: Some(host.root.clone()),
        timeout: args.timeout.or(host.config.python.timeout),
        ..ExecOptions::default()
    };
    let outcome = host
        .runner
        .execute(&command, &options, &CancelToken::new())?;

    std::io::stdout().write_all(outcome.output.stdout.as_bytes())?;
    std::io::stderr().write_all(outcome.output.stderr.as_bytes())?;
    if let Some(summary) = outcome.summary {
        eprintln!(
            "tirun: ran {}, passed {}, failed {}, errors {}, skipped {}",
            summary.ran, summary.passed, summary.failed, summary.errors, summary.skipped
        );
    }

    Ok(if outcome.passed() {
        ExitCode::Success
    } else {
        ExitCode::TestsFailed
    })
}
