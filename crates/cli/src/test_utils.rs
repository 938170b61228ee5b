// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared unit test utilities.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::exec::{CancelToken, ExecOptions, ExecOutput, ProcessFactory};
use crate::fs::MemoryFileSystem;
use crate::runners::{Capabilities, CommandLimits, RunnableTest, RunnerSettings};

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically.
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// Shorthand for a RunnableTest.
pub fn rt(package: &str, class: &str, method: &str) -> RunnableTest {
    RunnableTest::new(package, class, method)
}

/// Process factory that records commands instead of running them.
#[derive(Default)]
pub struct RecordingProcessFactory {
    pub commands: Mutex<Vec<String>>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RecordingProcessFactory {
    /// Factory whose every run exits with `exit_code` and the given output.
    pub fn replying(exit_code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        })
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl ProcessFactory for RecordingProcessFactory {
    fn run(&self, command: &str, _options: &ExecOptions, cancel: &CancelToken) -> Result<ExecOutput> {
        self.commands.lock().unwrap().push(command.to_string());
        if cancel.is_cancelled() {
            return Err(crate::Error::Cancelled);
        }
        Ok(ExecOutput {
            exit_code: Some(self.exit_code),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        })
    }
}

/// Agent path used by runner tests.
pub const TEST_AGENT: &str = "/opt/agent/bin/agent";

/// Capabilities over an in-memory tree and a recording process factory.
pub fn memory_caps(fs: MemoryFileSystem, process: Arc<RecordingProcessFactory>) -> Capabilities {
    Capabilities {
        fs: Arc::new(fs),
        process,
        agent_path: TEST_AGENT.to_string(),
    }
}

/// Runner settings rooted at `/repo` with list files under `/tmp/tirun`.
pub fn repo_settings() -> RunnerSettings {
    RunnerSettings {
        root: PathBuf::from("/repo"),
        limits: CommandLimits {
            list_dir: PathBuf::from("/tmp/tirun"),
            ..CommandLimits::default()
        },
        ..RunnerSettings::default()
    }
}
