// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `tirun discover` and `tirun packages`.

use std::io::Write;
use std::path::Path;

use tirun::cli::{DiscoverArgs, OutputFormat, RunnerArgs};
use tirun::error::ExitCode;
use tirun::host::Host;

pub fn discover(config: Option<&Path>, args: &DiscoverArgs) -> anyhow::Result<ExitCode> {
    let host = Host::open(config, &args.runner)?;
    let globs = host.globs(&args.globs);
    let tests = host.runner.detect_tests(&globs)?;
    tracing::info!("discovered {} tests", tests.len());

    let mut out = std::io::stdout().lock();
    match args.output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &tests)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for test in &tests {
                if test.class.is_empty() {
                    writeln!(out, "{}::{}", test.package, test.method)?;
                } else {
                    writeln!(out, "{}::{}::{}", test.package, test.class, test.method)?;
                }
            }
        }
    }
    Ok(ExitCode::Success)
}

pub fn packages(config: Option<&Path>, args: &RunnerArgs) -> anyhow::Result<ExitCode> {
    let host = Host::open(config, args)?;
    let packages = host.runner.detect_packages()?;

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &packages)?;
    writeln!(out)?;
    Ok(ExitCode::Success)
}
