// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

/// tirun error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file, agent path, or runner selection is invalid
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// File I/O error
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed test glob.
    #[error("invalid test glob '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    /// Selection was empty and a full run was not requested.
    #[error("no tests selected")]
    NoTestsSelected,

    /// The runner's framework cannot provide this operation.
    #[error("{operation} is not supported by the {runner} runner")]
    Unsupported {
        runner: &'static str,
        operation: &'static str,
    },

    /// A selected test cannot be expressed on the framework's command line.
    #[error("cannot build command for test '{test}': {reason}")]
    CommandConstruction { test: String, reason: String },

    /// Execution was cancelled by the caller.
    #[error("test run cancelled")]
    Cancelled,

    /// Execution exceeded its time limit.
    #[error("test run timed out after {0:?}")]
    TimedOut(Duration),

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error came from cancellation or a timeout rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::TimedOut(_))
    }
}

/// Result type using tirun Error
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command succeeded (or all tests passed)
    Success = 0,
    /// The test framework reported failures
    TestsFailed = 1,
    /// Configuration or argument error
    ConfigError = 2,
    /// Internal error
    InternalError = 3,
    /// Nothing selected; execution skipped
    NoTestsSelected = 4,
    /// Run cancelled or timed out
    Cancelled = 5,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. } | Error::Argument(_) | Error::Glob { .. } => ExitCode::ConfigError,
            Error::Unsupported { .. } | Error::CommandConstruction { .. } => ExitCode::ConfigError,
            Error::NoTestsSelected => ExitCode::NoTestsSelected,
            Error::Cancelled | Error::TimedOut(_) => ExitCode::Cancelled,
            Error::Io { .. } | Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
