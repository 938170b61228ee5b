// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test command construction.
//!
//! Turns a selection plus run flags into one shell command:
//!
//! ```text
//! [<agent> --config <cfg> --framework <name> --] <framework cmd> <ids...> [user args]
//! ```
//!
//! Large selections move the ids into a list file; the command then
//! references the file instead of inlining every id.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use super::RunnableTest;
use crate::error::{Error, Result};
use crate::fs::FileSystem;

/// Default selection size above which ids go to a list file.
pub const DEFAULT_LIST_FILE_THRESHOLD: usize = 256;

/// Default ceiling on inline command length, in bytes.
pub const DEFAULT_MAX_COMMAND_LEN: usize = 8192;

/// Inputs to [`super::Runner::build_command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRequest<'a> {
    /// Impact-selected tests. Ignored when `run_all` is set.
    pub selected: &'a [RunnableTest],
    /// Appended verbatim after test selection.
    pub user_args: &'a str,
    /// Instrumentation agent config file.
    pub agent_config_path: &'a str,
    /// Run without the instrumentation agent.
    pub ignore_instrumentation: bool,
    /// Run the framework's full suite.
    pub run_all: bool,
}

/// Limits that switch inline ids to a list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLimits {
    /// Selection size above which a list file is used.
    pub list_file_threshold: usize,
    /// Inline command length above which a list file is used.
    pub max_command_len: usize,
    /// Directory list files are placed in.
    pub list_dir: PathBuf,
}

impl Default for CommandLimits {
    fn default() -> Self {
        Self {
            list_file_threshold: DEFAULT_LIST_FILE_THRESHOLD,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
            list_dir: std::env::temp_dir(),
        }
    }
}

/// A test-id list the command reads at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListArtifact {
    pub path: PathBuf,
    /// One id per line, sorted.
    pub contents: String,
}

/// A ready-to-run test command.
///
/// Building never writes files; when the selection was moved to a list
/// file the host calls [`TestCommand::write_artifacts`] before executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    command: String,
    artifact: Option<ListArtifact>,
}

impl TestCommand {
    pub fn as_str(&self) -> &str {
        &self.command
    }

    pub fn into_string(self) -> String {
        self.command
    }

    /// List file the command depends on, if any.
    pub fn artifact(&self) -> Option<&ListArtifact> {
        self.artifact.as_ref()
    }

    /// Write the list file (if any) to disk.
    pub fn write_artifacts(&self) -> Result<()> {
        let Some(artifact) = &self.artifact else {
            return Ok(());
        };
        if let Some(parent) = artifact.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&artifact.path, &artifact.contents).map_err(|source| Error::Io {
            path: artifact.path.clone(),
            source,
        })
    }
}

impl fmt::Display for TestCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

/// Framework-specific command syntax.
pub(crate) trait CommandSyntax {
    /// Framework name passed to the agent.
    fn framework(&self) -> &'static str;

    /// Command that runs the given (already quoted) test ids.
    fn base(&self) -> String;

    /// Command that runs the whole suite.
    fn full_suite(&self) -> String;

    /// Wire-format id for one test, or why it cannot be expressed.
    fn test_id(&self, test: &RunnableTest) -> std::result::Result<String, String>;

    /// Command that reads ids from `list` (quoted path supplied).
    fn with_list_file(&self, quoted_list: &str) -> String;
}

/// Everything command construction needs besides the request.
pub(crate) struct BuildContext<'a> {
    pub fs: &'a dyn FileSystem,
    /// Directory the command runs in; relative request paths resolve here.
    pub root: &'a Path,
    pub agent_path: &'a str,
    pub limits: &'a CommandLimits,
}

/// Quote one word for `sh`. Safe words are returned unchanged.
pub(crate) fn quote(word: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(word)).into_owned()
}

/// Build the command for `request` using `syntax`.
pub(crate) fn build(
    syntax: &dyn CommandSyntax,
    ctx: &BuildContext<'_>,
    request: &CommandRequest<'_>,
) -> Result<TestCommand> {
    if !request.run_all && request.selected.is_empty() {
        return Err(Error::NoTestsSelected);
    }

    let prefix = instrumentation_prefix(syntax.framework(), ctx, request)?;

    let (body, artifact) = if request.run_all {
        if !request.selected.is_empty() {
            tracing::debug!(
                "run_all set; ignoring {} selected tests",
                request.selected.len()
            );
        }
        (syntax.full_suite(), None)
    } else {
        selection_body(syntax, ctx, request, prefix.as_deref())?
    };

    let command = assemble(prefix.as_deref(), &body, request.user_args);
    tracing::debug!("{} command: {}", syntax.framework(), command);
    Ok(TestCommand { command, artifact })
}

fn selection_body(
    syntax: &dyn CommandSyntax,
    ctx: &BuildContext<'_>,
    request: &CommandRequest<'_>,
    prefix: Option<&str>,
) -> Result<(String, Option<ListArtifact>)> {
    let unique: BTreeSet<&RunnableTest> = request.selected.iter().collect();
    let ids = unique
        .into_iter()
        .map(|test| {
            syntax.test_id(test).map_err(|reason| Error::CommandConstruction {
                test: display_test(test),
                reason,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let inline = std::iter::once(syntax.base())
        .chain(ids.iter().map(|id| quote(id)))
        .collect::<Vec<_>>()
        .join(" ");
    let inline_len = assemble(prefix, &inline, request.user_args).len();

    if ids.len() <= ctx.limits.list_file_threshold && inline_len <= ctx.limits.max_command_len {
        return Ok((inline, None));
    }

    let artifact = list_artifact(syntax.framework(), &ids, &ctx.limits.list_dir);
    tracing::debug!(
        "{} tests ({} bytes inline) moved to {}",
        ids.len(),
        inline_len,
        artifact.path.display()
    );
    let body = syntax.with_list_file(&quote(&artifact.path.to_string_lossy()));
    Ok((body, Some(artifact)))
}

/// List file named by a hash of its contents, so equal selections share a path.
fn list_artifact(framework: &str, ids: &[String], dir: &Path) -> ListArtifact {
    let mut contents = ids.join("\n");
    contents.push('\n');

    let digest = fnv1a64(&[framework.as_bytes(), b"\0".as_slice(), contents.as_bytes()]);
    let path = dir.join(format!("tirun-selection-{digest:016x}.txt"));

    ListArtifact { path, contents }
}

/// Agent prefix, or None when instrumentation is off.
/// 64-bit FNV-1a over the concatenated `parts`.
///
/// List file names are derived from this value and must stay the same
/// across tirun releases and platforms.
pub(crate) fn fnv1a64(parts: &[&[u8]]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    parts
        .iter()
        .flat_map(|part| part.iter())
        .fold(OFFSET_BASIS, |hash, &byte| {
            (hash ^ u64::from(byte)).wrapping_mul(PRIME)
        })
}

fn instrumentation_prefix(
    framework: &str,
    ctx: &BuildContext<'_>,
    request: &CommandRequest<'_>,
) -> Result<Option<String>> {
    if request.ignore_instrumentation {
        return Ok(None);
    }
    if ctx.agent_path.trim().is_empty() {
        return Err(Error::Config {
            message: "instrumentation requested but no agent path is configured".to_string(),
            path: None,
        });
    }
    if request.agent_config_path.trim().is_empty() {
        return Err(Error::Config {
            message: "instrumentation requested but no agent config path was given".to_string(),
            path: None,
        });
    }
    // The command runs in the root, so a relative config path is the root's.
    let config_path = ctx.root.join(request.agent_config_path);
    if !ctx.fs.exists(&config_path) {
        return Err(Error::Config {
            message: format!("agent config not found: {}", config_path.display()),
            path: Some(config_path),
        });
    }

    Ok(Some(format!(
        "{} --config {} --framework {} --",
        quote(ctx.agent_path),
        quote(&config_path.to_string_lossy()),
        framework
    )))
}

fn assemble(prefix: Option<&str>, body: &str, user_args: &str) -> String {
    let mut command = String::with_capacity(body.len() + user_args.len() + 64);
    if let Some(prefix) = prefix {
        command.push_str(prefix);
        command.push(' ');
    }
    command.push_str(body);
    if !user_args.trim().is_empty() {
        command.push(' ');
        command.push_str(user_args);
    }
    command
}

fn display_test(test: &RunnableTest) -> String {
    if test.class.is_empty() {
        format!("{}::{}", test.package, test.method)
    } else {
        format!("{}::{}::{}", test.package, test.class, test.method)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
