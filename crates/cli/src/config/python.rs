// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `[python]` section.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::runners::{CommandLimits, RunnerSettings, TestGlob};

/// Python runner configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PythonConfig {
    /// Test framework: "unittest" (default) or "pytest".
    #[serde(default)]
    pub framework: Option<String>,

    /// Interpreter used in built commands.
    #[serde(default = "PythonConfig::default_interpreter")]
    pub interpreter: String,

    /// Instrumentation agent binary.
    #[serde(default)]
    pub agent_path: Option<String>,

    /// Globs scanned when no globs are passed explicitly.
    #[serde(default = "PythonConfig::default_test_globs")]
    pub test_globs: Vec<TestGlob>,

    /// Selection size above which ids go to a list file.
    #[serde(default = "PythonConfig::default_list_file_threshold")]
    pub list_file_threshold: usize,

    /// Inline command length ceiling in bytes.
    #[serde(default = "PythonConfig::default_max_command_len")]
    pub max_command_len: usize,

    /// Directory for list files (default: system temp dir).
    #[serde(default)]
    pub list_dir: Option<PathBuf>,

    /// Parallel file parses during discovery.
    #[serde(default = "PythonConfig::default_discovery_threads")]
    pub discovery_threads: usize,

    /// Kill test runs after this long.
    #[serde(default, deserialize_with = "super::duration::deserialize_option")]
    pub timeout: Option<Duration>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            framework: None,
            interpreter: Self::default_interpreter(),
            agent_path: None,
            test_globs: Self::default_test_globs(),
            list_file_threshold: Self::default_list_file_threshold(),
            max_command_len: Self::default_max_command_len(),
            list_dir: None,
            discovery_threads: Self::default_discovery_threads(),
            timeout: None,
        }
    }
}

impl PythonConfig {
    pub(crate) fn default_interpreter() -> String {
        "python3".to_string()
    }

    pub(crate) fn default_test_globs() -> Vec<TestGlob> {
        RunnerSettings::default().test_globs
    }

    pub(crate) fn default_list_file_threshold() -> usize {
        crate::runners::DEFAULT_LIST_FILE_THRESHOLD
    }

    pub(crate) fn default_max_command_len() -> usize {
        crate::runners::DEFAULT_MAX_COMMAND_LEN
    }

    pub(crate) fn default_discovery_threads() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get().min(8))
            .unwrap_or(4)
    }

    /// Runner settings rooted at `root`. A relative `list_dir` is taken
    /// relative to `root`.
    pub fn runner_settings(&self, root: &Path) -> RunnerSettings {
        let defaults = CommandLimits::default();
        let list_dir = match &self.list_dir {
            Some(dir) if dir.is_relative() => root.join(dir),
            Some(dir) => dir.clone(),
            None => defaults.list_dir,
        };
        RunnerSettings {
            root: root.to_path_buf(),
            python: self.interpreter.clone(),
            test_globs: self.test_globs.clone(),
            discovery_threads: self.discovery_threads.max(1),
            limits: CommandLimits {
                list_file_threshold: self.list_file_threshold,
                max_command_len: self.max_command_len,
                list_dir,
            },
        }
    }
}

#[cfg(test)]
#[path = "python_tests.rs"]
mod tests;
