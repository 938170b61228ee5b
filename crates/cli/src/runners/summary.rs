// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test framework output summaries.

use std::time::Duration;

use serde::Serialize;

use crate::exec::ExecOutput;

/// Counts reported by a framework at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub ran: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    /// Wall time reported by the framework.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl RunSummary {
    /// Whether nothing failed or errored.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Result of executing a test command to completion.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Parsed summary, if the framework printed one.
    pub summary: Option<RunSummary>,
    pub output: ExecOutput,
}

impl RunOutcome {
    /// Tests passed, judged by the framework's exit status.
    pub fn passed(&self) -> bool {
        self.output.success()
    }
}

/// Parse unittest output.
///
/// unittest writes its report to stderr:
/// ```text
/// test_add (tests.test_math.TestMath.test_add) ... ok
/// test_sub (tests.test_math.TestMath.test_sub) ... FAIL
/// ----------------------------------------------------------------------
/// Ran 2 tests in 0.001s
///
/// FAILED (failures=1, skipped=1)
/// ```
///
/// Returns None when no `Ran N tests` line is present (e.g., an import
/// error before any test ran).
pub fn parse_unittest_summary(stderr: &str, stdout: &str) -> Option<RunSummary> {
    let mut summary: Option<RunSummary> = None;

    for line in stderr.lines().chain(stdout.lines()) {
        let line = line.trim();

        if let Some((count, duration)) = parse_ran_line(line) {
            summary = Some(RunSummary {
                ran: count,
                duration,
                ..RunSummary::default()
            });
            continue;
        }

        let Some(current) = summary.as_mut() else {
            continue;
        };
        if let Some(counts) = parse_status_line(line) {
            current.failed = counts.failed;
            current.errors = counts.errors;
            current.skipped = counts.skipped;
        }
    }

    summary.map(|mut s| {
        s.passed = s.ran.saturating_sub(s.failed + s.errors + s.skipped);
        s
    })
}

/// Parse the `Ran N test(s) in X.XXXs` line.
fn parse_ran_line(line: &str) -> Option<(usize, Option<Duration>)> {
    if !line.starts_with("Ran ") || !line.contains(" test") || !line.contains(" in ") {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let count = parts[1].parse::<usize>().ok()?;
    let duration = parse_seconds(parts.last()?)?;
    Some((count, duration))
}

/// Parse `OK`, `OK (skipped=1)` or `FAILED (failures=1, errors=2)`.
fn parse_status_line(line: &str) -> Option<RunSummary> {
    let details = if line == "OK" || line == "FAILED" {
        ""
    } else if let Some(rest) = line
        .strip_prefix("OK (")
        .or_else(|| line.strip_prefix("FAILED ("))
    {
        rest.strip_suffix(')')?
    } else {
        return None;
    };

    let mut counts = RunSummary::default();
    for pair in details.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=')?;
        let value = value.trim().parse::<usize>().ok()?;
        match key.trim() {
            "failures" => counts.failed = value,
            "errors" => counts.errors = value,
            "skipped" | "expected failures" => counts.skipped += value,
            _ => {}
        }
    }
    Some(counts)
}

/// Parse the pytest terminal summary.
///
/// ```text
/// ===================== 3 passed, 1 failed, 2 skipped in 0.12s =====================
/// ```
///
/// The last matching line wins. `-q` output (without the `=` rule) parses too.
pub fn parse_pytest_summary(output: &str) -> Option<RunSummary> {
    output.lines().rev().find_map(parse_pytest_line)
}

fn parse_pytest_line(line: &str) -> Option<RunSummary> {
    let line = line.trim().trim_matches('=').trim();
    let (counts, timing) = line.rsplit_once(" in ")?;
    let duration = parse_seconds(timing.split_whitespace().next()?)?;

    let mut summary = RunSummary {
        duration,
        ..RunSummary::default()
    };
    if counts == "no tests ran" {
        return Some(summary);
    }

    let mut matched = false;
    for part in counts.split(',').map(str::trim) {
        let (n, word) = part.split_once(' ')?;
        let n = n.parse::<usize>().ok()?;
        match word {
            "passed" | "xpassed" => summary.passed += n,
            "failed" => summary.failed += n,
            "error" | "errors" => summary.errors += n,
            "skipped" | "xfailed" => summary.skipped += n,
            "deselected" | "warning" | "warnings" | "rerun" => continue,
            _ => return None,
        }
        matched = true;
    }
    if !matched {
        return None;
    }

    summary.ran = summary.passed + summary.failed + summary.errors + summary.skipped;
    Some(summary)
}

/// Parse a timing like `0.001s`.
///
/// The outer `None` rejects the format. The inner one is a number no
/// `Duration` holds (negative, NaN or overflowing).
fn parse_seconds(s: &str) -> Option<Option<Duration>> {
    let secs = s.trim().strip_suffix('s')?.parse::<f64>().ok()?;
    Some(Duration::try_from_secs_f64(secs).ok())
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
