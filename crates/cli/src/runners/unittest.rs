// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Python unittest runner.
//!
//! Tests are `TestCase` subclasses and their `test*` methods. Ids use the
//! dotted form `loadTestsFromName` accepts:
//!
//! ```text
//! tests.test_math.TestMath.test_add
//! ```
//!
//! Discovery keeps to what `python -m unittest discover` imports: `test*.py`
//! modules reached only through package directories. Other files matched by
//! the globs are skipped, so a run-all executes the same tests.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::command::{self, BuildContext, CommandSyntax};
use super::discovery::{discover, slash_path};
use super::py_scan::{PyClass, PyModule, ScanError, scan};
use super::summary::{RunOutcome, parse_unittest_summary};
use super::{Capabilities, CommandRequest, RunnableTest, Runner, RunnerSettings, TestCommand, TestGlob};
use crate::error::{Error, Result};
use crate::exec::{CancelToken, ExecOptions};
use crate::fs::FileSystem;

#[allow(clippy::expect_used)]
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\W\d]\w*$").expect("valid regex"));

/// Default `discover` pattern `test*.py`, limited to importable module names.
#[allow(clippy::expect_used)]
static DISCOVER_MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^test\w*\.py$").expect("valid regex"));

/// Reads whitespace-separated ids from the file named by argv[1] and hands
/// them, after any user args, to unittest's own command line.
const LIST_LOADER: &str = "import sys,unittest;\
ids=open(sys.argv[1]).read().split();\
unittest.main(module=None,argv=[\"python -m unittest\"]+sys.argv[2:]+ids)";

/// Runner for Python's built-in unittest framework.
pub struct UnittestRunner {
    caps: Capabilities,
    settings: RunnerSettings,
}

impl UnittestRunner {
    pub fn new(caps: Capabilities, settings: RunnerSettings) -> Self {
        Self { caps, settings }
    }

    fn syntax(&self) -> UnittestSyntax<'_> {
        UnittestSyntax {
            python: &self.settings.python,
        }
    }
}

impl Runner for UnittestRunner {
    fn name(&self) -> &'static str {
        "unittest"
    }

    fn language(&self) -> &'static str {
        "python"
    }

    fn detect_packages(&self) -> Result<Vec<String>> {
        Err(Error::Unsupported {
            runner: "unittest",
            operation: "package detection",
        })
    }

    fn detect_tests(&self, globs: &[TestGlob]) -> Result<Vec<RunnableTest>> {
        let fs = &*self.caps.fs;
        let root = &self.settings.root;
        discover(fs, root, globs, self.settings.discovery_threads, |rel, content| {
            if !discoverable(fs, root, rel) {
                tracing::debug!("skipping {}: not reached by unittest discover", rel.display());
                return Ok(Vec::new());
            }
            parse_file(rel, content)
        })
    }

    fn build_command(&self, request: &CommandRequest<'_>) -> Result<TestCommand> {
        let ctx = BuildContext {
            fs: &*self.caps.fs,
            root: &self.settings.root,
            agent_path: &self.caps.agent_path,
            limits: &self.settings.limits,
        };
        command::build(&self.syntax(), &ctx, request)
    }

    fn execute(
        &self,
        command: &TestCommand,
        options: &ExecOptions,
        cancel: &CancelToken,
    ) -> Result<RunOutcome> {
        command.write_artifacts()?;
        tracing::info!("running unittest: {}", command);
        let output = self.caps.process.run(command.as_str(), options, cancel)?;
        let summary = parse_unittest_summary(&output.stderr, &output.stdout);
        Ok(RunOutcome { summary, output })
    }
}

/// Tests in one file: methods of test-case classes.
fn parse_file(rel: &Path, content: &str) -> std::result::Result<Vec<RunnableTest>, ScanError> {
    let module = scan(content)?;
    let package = module_path(rel);

    let mut tests = Vec::new();
    for class in test_classes(&module) {
        let methods = module.methods_with_inherited(class, |m| m.starts_with("test"));
        tests.extend(
            methods
                .into_iter()
                .map(|method| RunnableTest::new(package.clone(), class.name.clone(), method)),
        );
    }
    Ok(tests)
}

/// Whether `python -m unittest discover` imports `rel`: a `test*.py` module
/// whose every enclosing directory below the root holds an `__init__.py`.
fn discoverable(fs: &dyn FileSystem, root: &Path, rel: &Path) -> bool {
    let named = rel
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| DISCOVER_MODULE.is_match(name));
    named
        && rel
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .all(|dir| fs.exists(&root.join(dir).join("__init__.py")))
}

/// Classes deriving from a `*TestCase` base, directly or through a class
/// defined earlier in the same file.
fn test_classes(module: &PyModule) -> Vec<&PyClass> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    let mut out = Vec::new();
    for class in &module.classes {
        let via_local = class.bases.iter().any(|b| names.contains(b.as_str()));
        if class.extends_test_case() || via_local {
            names.insert(class.name.as_str());
            out.push(class);
        }
    }
    out
}

/// Dotted module path: `tests/test_math.py` -> `tests.test_math`,
/// `pkg/__init__.py` -> `pkg`.
fn module_path(rel: &Path) -> String {
    let slashed = slash_path(&rel.with_extension(""));
    let slashed = slashed
        .strip_suffix("/__init__")
        .unwrap_or(&slashed)
        .to_string();
    slashed.replace('/', ".")
}

struct UnittestSyntax<'a> {
    python: &'a str,
}

impl CommandSyntax for UnittestSyntax<'_> {
    fn framework(&self) -> &'static str {
        "unittest"
    }

    fn base(&self) -> String {
        format!("{} -m unittest", command::quote(self.python))
    }

    fn full_suite(&self) -> String {
        format!("{} -m unittest discover", command::quote(self.python))
    }

    fn test_id(&self, test: &RunnableTest) -> std::result::Result<String, String> {
        if test.class.is_empty() {
            return Err("unittest tests must belong to a TestCase class".to_string());
        }
        for segment in test.package.split('.') {
            if !IDENTIFIER.is_match(segment) {
                return Err(format!("'{}' is not an importable module path", test.package));
            }
        }
        for (what, name) in [("class", &test.class), ("method", &test.method)] {
            if !IDENTIFIER.is_match(name) {
                return Err(format!("{what} '{name}' is not a Python identifier"));
            }
        }
        Ok(format!("{}.{}.{}", test.package, test.class, test.method))
    }

    fn with_list_file(&self, quoted_list: &str) -> String {
        format!(
            "{} -c {} {}",
            command::quote(self.python),
            command::quote(LIST_LOADER),
            quoted_list
        )
    }
}

#[cfg(test)]
#[path = "unittest_tests.rs"]
mod tests;
