// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pytest runner.
//!
//! Selects tests by node id (`tests/test_math.py::TestMath::test_add`).
//! Node ids match exactly, unlike `-k` expressions, so one test never
//! drags in others sharing its name as a prefix.

use std::path::Path;

use super::command::{self, BuildContext, CommandSyntax};
use super::discovery::{discover, slash_path};
use super::py_scan::{PyClass, PyModule, ScanError, scan};
use super::summary::{RunOutcome, parse_pytest_summary};
use super::{
    Capabilities, CommandRequest, RunnableTest, Runner, RunnerSettings, TestCommand, TestGlob,
    packages_from_tests,
};
use crate::error::Result;
use crate::exec::{CancelToken, ExecOptions};

/// Runner for pytest.
pub struct PytestRunner {
    caps: Capabilities,
    settings: RunnerSettings,
}

impl PytestRunner {
    pub fn new(caps: Capabilities, settings: RunnerSettings) -> Self {
        Self { caps, settings }
    }

    fn syntax(&self) -> PytestSyntax<'_> {
        PytestSyntax {
            python: &self.settings.python,
        }
    }
}

impl Runner for PytestRunner {
    fn name(&self) -> &'static str {
        "pytest"
    }

    fn language(&self) -> &'static str {
        "python"
    }

    fn detect_packages(&self) -> Result<Vec<String>> {
        let tests = self.detect_tests(&self.settings.test_globs)?;
        Ok(packages_from_tests(&tests))
    }

    fn detect_tests(&self, globs: &[TestGlob]) -> Result<Vec<RunnableTest>> {
        discover(
            &*self.caps.fs,
            &self.settings.root,
            globs,
            self.settings.discovery_threads,
            parse_file,
        )
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
        tracing::info!("running pytest: {}", command);
        let output = self.caps.process.run(command.as_str(), options, cancel)?;
        let summary = parse_pytest_summary(&output.stdout);
        Ok(RunOutcome { summary, output })
    }
}

fn parse_file(rel: &Path, content: &str) -> std::result::Result<Vec<RunnableTest>, ScanError> {
    let module = scan(content)?;
    let package = slash_path(rel);
    let is_test = |name: &str| name.starts_with("test");

    let mut tests: Vec<RunnableTest> = module
        .functions
        .iter()
        .filter(|f| is_test(f.as_str()))
        .map(|f| RunnableTest::new(package.clone(), "", f.clone()))
        .collect();

    for class in module.classes.iter().filter(|c| is_collected_class(c)) {
        collect_class(&module, class, class.name.clone(), &package, &mut tests);
    }
    Ok(tests)
}

/// Tests of `class` and of collected classes nested in it. Nested classes
/// join their names with `::`, as in `TestOuter::TestInner`.
fn collect_class(
    module: &PyModule,
    class: &PyClass,
    node: String,
    package: &str,
    tests: &mut Vec<RunnableTest>,
) {
    for method in module.methods_with_inherited(class, |name| name.starts_with("test")) {
        tests.push(RunnableTest::new(package, node.clone(), method));
    }
    for child in class.children.iter().filter(|c| is_collected_class(c)) {
        collect_class(module, child, format!("{node}::{}", child.name), package, tests);
    }
}

/// pytest collects `Test*` classes without `__init__`, and any
/// unittest-style `TestCase` subclass.
fn is_collected_class(class: &PyClass) -> bool {
    if class.extends_test_case() {
        return true;
    }
    class.name.starts_with("Test") && !class.methods.iter().any(|m| m == "__init__")
}

struct PytestSyntax<'a> {
    python: &'a str,
}

impl CommandSyntax for PytestSyntax<'_> {
    fn framework(&self) -> &'static str {
        "pytest"
    }

    fn base(&self) -> String {
        format!("{} -m pytest", command::quote(self.python))
    }

    fn full_suite(&self) -> String {
        self.base()
    }

    fn test_id(&self, test: &RunnableTest) -> std::result::Result<String, String> {
        if test.package.is_empty() || test.method.is_empty() {
            return Err("node ids need a file path and a test name".to_string());
        }
        for part in [&test.package, &test.method] {
            if part.contains("::") {
                return Err(format!("'{part}' contains '::'"));
            }
        }
        // Nested classes are spelled `Outer::Inner`.
        if !test.class.is_empty() && test.class.split("::").any(str::is_empty) {
            return Err(format!("'{}' has an empty class segment", test.class));
        }
        for part in [&test.package, &test.class, &test.method] {
            if let Some(c) = part.chars().find(|c| matches!(c, '[' | ']') || c.is_control()) {
                return Err(format!("'{}' contains {:?}", part.escape_debug(), c));
            }
        }
        Ok(if test.class.is_empty() {
            format!("{}::{}", test.package, test.method)
        } else {
            format!("{}::{}::{}", test.package, test.class, test.method)
        })
    }

    /// pytest expands `@file` arguments into one argument per line (8.2+).
    fn with_list_file(&self, quoted_list: &str) -> String {
        format!("{} @{}", self.base(), quoted_list)
    }
}

#[cfg(test)]
#[path = "pytest_tests.rs"]
mod tests;
