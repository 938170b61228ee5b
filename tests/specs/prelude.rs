// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for testing tirun CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::{Predicate, PredicateBooleanExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Trait for converting into a string predicate.
/// Allows passing `&str` (as contains) or any `Predicate<str>`.
pub trait IntoStrPredicate<P: Predicate<str>> {
    fn into_predicate(self) -> P;
}

impl IntoStrPredicate<predicates::str::ContainsPredicate> for &str {
    fn into_predicate(self) -> predicates::str::ContainsPredicate {
        predicates::str::contains(self)
    }
}

impl<P: Predicate<str>> IntoStrPredicate<P> for P {
    fn into_predicate(self) -> P {
        self
    }
}

/// Returns a Command configured to run the tirun binary
pub fn tirun_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tirun"));
    cmd.env_remove("TIRUN_CONFIG").env_remove("TIRUN_LOG");
    cmd
}

/// Start a tirun invocation with the given arguments
pub fn tirun(args: &[&str]) -> Invocation {
    Invocation {
        args: args.iter().map(|s| s.to_string()).collect(),
        dir: None,
        envs: Vec::new(),
        stdin: None,
    }
}

/// Fluent builder for one tirun invocation
pub struct Invocation {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    stdin: Option<String>,
}

#[allow(dead_code)]
impl Invocation {
    /// Run inside a fixture directory
    pub fn on(mut self, fixture_name: &str) -> Self {
        self.dir = Some(fixture(fixture_name));
        self
    }

    /// Set working directory (alternative to fixture)
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// Feed stdin (used with `--tests -`)
    pub fn stdin(mut self, input: &str) -> Self {
        self.stdin = Some(input.to_string());
        self
    }

    pub fn passes(self) -> RunAssert {
        self.exits(0)
    }

    pub fn exits(self, code: i32) -> RunAssert {
        let stdin = self.stdin.clone();
        let mut cmd = assert_cmd::Command::from_std(self.command());
        if let Some(input) = stdin {
            cmd.write_stdin(input);
        }
        let output = cmd.output().unwrap();
        let status = output.status.code();
        let run = RunAssert::new(output);
        assert_eq!(
            status,
            Some(code),
            "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
            run.stdout,
            run.stderr
        );
        run
    }

    fn command(self) -> Command {
        let mut cmd = tirun_cmd();
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Captured output of one invocation, for chained assertions.
pub struct RunAssert {
    stdout: String,
    stderr: String,
}

#[allow(dead_code)]
impl RunAssert {
    fn new(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn stdout(&self) -> String {
        self.stdout.clone()
    }

    pub fn stderr(&self) -> String {
        self.stderr.clone()
    }

    /// Stdout parsed as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).expect("stdout should be valid JSON")
    }

    /// Exact stdout match, diffed on failure.
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout.as_str(), expected);
        self
    }

    pub fn stdout_has<I: IntoStrPredicate<P>, P: Predicate<str>>(self, predicate: I) -> Self {
        check("stdout", &self.stdout, predicate.into_predicate(), true);
        self
    }

    pub fn stdout_lacks<I: IntoStrPredicate<P>, P: Predicate<str>>(self, predicate: I) -> Self {
        check("stdout", &self.stdout, predicate.into_predicate(), false);
        self
    }

    pub fn stderr_has<I: IntoStrPredicate<P>, P: Predicate<str>>(self, predicate: I) -> Self {
        check("stderr", &self.stderr, predicate.into_predicate(), true);
        self
    }
}

fn check<P: Predicate<str>>(stream: &str, text: &str, predicate: P, expected: bool) {
    assert_eq!(
        predicate.eval(text),
        expected,
        "{stream} {} match:\n{text}",
        if expected { "should" } else { "should not" }
    );
}

/// Python project under `tests/fixtures/`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
}

// =============================================================================
// Project
// =============================================================================

/// Temporary project directory with helper methods.
///
/// - Auto-creates parent directories
/// - Adds `version = 1` prefix to config
/// - Marks the directory as a git root so config search stops there
pub struct Project {
    dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl Project {
    /// Create an empty project with no config
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        Self { dir }
    }

    /// Write tirun.toml (`version = 1` is prepended)
    pub fn config(&self, content: &str) {
        self.file("tirun.toml", &format!("version = 1\n{}", content));
    }

    /// Write a file, creating parent directories
    pub fn file(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path as a string argument
    pub fn arg(&self, rel: &str) -> String {
        self.dir.path().join(rel).to_string_lossy().into_owned()
    }

    /// Path below the canonicalized project root, as tirun prints it
    pub fn canonical(&self, rel: &str) -> String {
        let root = self.dir.path().canonicalize().unwrap();
        root.join(rel).to_string_lossy().into_owned()
    }
}
