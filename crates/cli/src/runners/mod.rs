// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test runner adapters.
//!
//! Each runner binds the injected capabilities for one test framework and
//! exposes the same contract: package detection, test discovery, and
//! command construction. Hosts pick a runner with [`create_runner`].

mod command;
mod discovery;
mod py_scan;
mod pytest;
mod summary;
mod unittest;

pub use command::{
    CommandLimits, CommandRequest, DEFAULT_LIST_FILE_THRESHOLD, DEFAULT_MAX_COMMAND_LEN,
    ListArtifact, TestCommand,
};
pub use discovery::{compile_globs, discover, matching_files};
pub use py_scan::{PyClass, PyModule, ScanError, scan};
pub use pytest::PytestRunner;
pub use summary::{RunOutcome, RunSummary, parse_pytest_summary, parse_unittest_summary};
pub use unittest::UnittestRunner;

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::exec::{CancelToken, ExecOptions, ProcessFactory};
use crate::fs::FileSystem;

/// Known runner names.
pub const RUNNER_NAMES: &[&str] = &["unittest", "pytest"];

/// Languages with at least one runner.
pub const LANGUAGES: &[&str] = &["python"];

/// One executable test case.
///
/// Field order gives the derived ordering: package, then class, then method.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunnableTest {
    /// Framework-native module path (dotted for unittest, slashed for pytest).
    pub package: String,
    /// Test-case class; empty for module-level test functions.
    #[serde(default)]
    pub class: String,
    /// Test method or function name.
    pub method: String,
}

impl RunnableTest {
    pub fn new(package: impl Into<String>, class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
            method: method.into(),
        }
    }
}

/// Glob pattern scoping discovery, relative to the runner root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestGlob(pub String);

impl TestGlob {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestGlob {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Capabilities injected into every runner.
#[derive(Clone)]
pub struct Capabilities {
    pub fs: Arc<dyn FileSystem>,
    pub process: Arc<dyn ProcessFactory>,
    /// Instrumentation agent binary. Empty when instrumentation is never used.
    pub agent_path: String,
}

/// Per-project runner settings, usually taken from `tirun.toml`.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Source tree root; globs and package paths are relative to it.
    pub root: PathBuf,
    /// Python interpreter used in built commands.
    pub python: String,
    /// Globs used when a runner discovers on its own (package detection).
    pub test_globs: Vec<TestGlob>,
    /// Upper bound on concurrent file parses during discovery.
    pub discovery_threads: usize,
    pub limits: CommandLimits,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            python: "python3".to_string(),
            test_globs: vec![TestGlob::new("**/test_*.py"), TestGlob::new("**/*_test.py")],
            discovery_threads: 4,
            limits: CommandLimits::default(),
        }
    }
}

/// Adapter contract for one test framework.
///
/// Implementations hold only immutable configuration, so one instance may
/// serve concurrent callers.
pub trait Runner: Send + Sync {
    /// Framework name (e.g., "unittest").
    fn name(&self) -> &'static str;

    /// Language the framework belongs to.
    fn language(&self) -> &'static str;

    /// Top-level packages containing tests.
    ///
    /// Returns [`Error::Unsupported`] for frameworks without a package concept.
    fn detect_packages(&self) -> Result<Vec<String>>;

    /// Enumerate every test in files matched by `globs`, sorted.
    fn detect_tests(&self, globs: &[TestGlob]) -> Result<Vec<RunnableTest>>;

    /// Build the single command that runs the requested tests.
    fn build_command(&self, request: &CommandRequest<'_>) -> Result<TestCommand>;

    /// Run a built command through the process capability.
    fn execute(
        &self,
        command: &TestCommand,
        options: &ExecOptions,
        cancel: &CancelToken,
    ) -> Result<RunOutcome>;
}

/// Default framework for a language.
pub fn default_framework(language: &str) -> Option<&'static str> {
    match language {
        "python" => Some("unittest"),
        _ => None,
    }
}

/// Construct the runner for `language`, optionally overriding the framework.
pub fn create_runner(
    language: &str,
    framework: Option<&str>,
    caps: Capabilities,
    settings: RunnerSettings,
) -> Result<Box<dyn Runner>> {
    let framework = match framework {
        Some(name) => name,
        None => default_framework(language).ok_or_else(|| Error::Config {
            message: format!(
                "unsupported language '{}' (supported: {})",
                language,
                LANGUAGES.join(", ")
            ),
            path: None,
        })?,
    };

    match (language, framework) {
        ("python", "unittest") => Ok(Box::new(UnittestRunner::new(caps, settings))),
        ("python", "pytest") => Ok(Box::new(PytestRunner::new(caps, settings))),
        _ => Err(Error::Config {
            message: format!(
                "no '{}' runner for language '{}' (known runners: {})",
                framework,
                language,
                RUNNER_NAMES.join(", ")
            ),
            path: None,
        }),
    }
}

/// Distinct top-level packages of discovered tests, sorted.
///
/// The first segment of each package path (split on `/` or `.`) is taken;
/// a bare `test_x.py` module yields `test_x`.
pub fn packages_from_tests(tests: &[RunnableTest]) -> Vec<String> {
    tests
        .iter()
        .filter_map(|t| {
            let first = t.package.split(['/', '.']).next()?;
            (!first.is_empty()).then(|| first.to_string())
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
