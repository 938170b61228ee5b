// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellable process execution.
//!
//! Built test commands are shell strings; [`ShellProcessFactory`] runs them
//! through `sh -c`. Cancellation and timeouts kill the child and surface as
//! [`Error::Cancelled`] / [`Error::TimedOut`], never as a test failure.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a host can hand one clone to the
/// executing thread and cancel from another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Options for a single execution.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Working directory (defaults to the current directory).
    pub cwd: Option<PathBuf>,
    /// Kill the process after this long.
    pub timeout: Option<Duration>,
    /// Extra environment variables.
    pub env: BTreeMap<String, String>,
}

/// Output of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, or None when terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Process-execution capability.
pub trait ProcessFactory: Send + Sync {
    /// Run a shell command until it exits, is cancelled, or times out.
    fn run(&self, command: &str, options: &ExecOptions, cancel: &CancelToken) -> Result<ExecOutput>;
}

/// Runs commands through `sh -c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellProcessFactory;

impl ProcessFactory for ShellProcessFactory {
    fn run(&self, command: &str, options: &ExecOptions, cancel: &CancelToken) -> Result<ExecOutput> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&options.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::info!("running: {}", command);
        let mut child = cmd.spawn().map_err(|source| Error::Io {
            path: PathBuf::from("sh"),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_or_cancel(&mut child, options.timeout, cancel)?;

        Ok(ExecOutput {
            exit_code: status.code(),
            stdout: join_output(stdout),
            stderr: join_output(stderr),
        })
    }
}

/// Poll the child until it exits, killing it on cancellation or timeout.
fn wait_or_cancel(
    child: &mut Child,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Result<std::process::ExitStatus> {
    let start = Instant::now();
    loop {
        let polled = child.try_wait().map_err(|source| Error::Io {
            path: PathBuf::from("sh"),
            source,
        })?;
        if let Some(status) = polled {
            return Ok(status);
        }

        if cancel.is_cancelled() {
            kill(child);
            tracing::warn!("test run cancelled after {:?}", start.elapsed());
            return Err(Error::Cancelled);
        }

        if let Some(limit) = timeout
            && start.elapsed() > limit
        {
            kill(child);
            tracing::warn!("test run timed out after {:?}", limit);
            return Err(Error::TimedOut(limit));
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

fn kill(child: &mut Child) {
    child.kill().ok();
    child.wait().ok();
}

/// Read a pipe to completion on a background thread so the child never
/// blocks on a full pipe buffer.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf).ok();
            buf
        })
    })
}

fn join_output(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
