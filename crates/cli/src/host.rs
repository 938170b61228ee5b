// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring between the CLI, the config file and a runner.
//!
//! The host owns everything the runners treat as external: config lookup,
//! real filesystem and process capabilities, and reading selections.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::RunnerArgs;
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::exec::ShellProcessFactory;
use crate::fs::OsFileSystem;
use crate::runners::{Capabilities, RunnableTest, Runner, TestGlob, create_runner};
use crate::walker::WalkerConfig;

/// A runner bound to the project it was created for.
pub struct Host {
    pub config: Config,
    pub root: PathBuf,
    pub runner: Box<dyn Runner>,
}

impl Host {
    /// Resolve config and construct the runner for `args`.
    pub fn open(config_path: Option<&Path>, args: &RunnerArgs) -> Result<Self> {
        let root = canonical_root(&args.root)?;
        let resolved = config::resolve_config(config_path, &root)?;
        let config = config::load_or_default(resolved.as_deref())?;
        Self::with_config(config, root, args)
    }

    /// Construct the runner from an already-loaded config.
    pub fn with_config(config: Config, root: PathBuf, args: &RunnerArgs) -> Result<Self> {
        let settings = config.python.runner_settings(&root);
        let caps = Capabilities {
            fs: Arc::new(OsFileSystem::new(WalkerConfig {
                threads: settings.discovery_threads,
                ..WalkerConfig::default()
            })),
            process: Arc::new(ShellProcessFactory),
            agent_path: args
                .agent
                .clone()
                .or_else(|| config.python.agent_path.clone())
                .unwrap_or_default(),
        };
        let framework = args
            .framework
            .as_deref()
            .or(config.python.framework.as_deref());
        let runner = create_runner(&args.lang, framework, caps, settings)?;
        tracing::debug!(
            "using {} runner for {} at {}",
            runner.name(),
            runner.language(),
            root.display()
        );

        Ok(Self {
            config,
            root,
            runner,
        })
    }

    /// Explicit globs, or the configured defaults when none are given.
    pub fn globs(&self, explicit: &[String]) -> Vec<TestGlob> {
        if explicit.is_empty() {
            self.config.python.test_globs.clone()
        } else {
            explicit.iter().map(|g| TestGlob::new(g.as_str())).collect()
        }
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize().map_err(|source| Error::Io {
        path: root.to_path_buf(),
        source,
    })
}

/// Read a JSON selection from `path`, or stdin for `-`.
pub fn read_selection(path: &Path) -> Result<Vec<RunnableTest>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?
    };
    parse_selection(&content)
}

/// Parse a JSON list of `{package, class, method}` objects.
pub fn parse_selection(content: &str) -> Result<Vec<RunnableTest>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content)
        .map_err(|e| Error::Argument(format!("invalid test selection: {e}")))
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
