// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Source tree walking with gitignore support.
//!
//! Uses the `ignore` crate to enumerate candidate test files. Entries are
//! streamed over a bounded channel so large trees never buffer twice.

use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender, bounded};
use ignore::{WalkBuilder, WalkState};

/// Maximum file size considered for discovery (10MB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default maximum directory depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Directories never descended into.
pub(crate) const SKIP_DIRECTORIES: &[&str] =
    &[".git", "node_modules", "__pycache__", ".venv", ".tox", ".mypy_cache"];

/// Walker configuration.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Maximum directory depth (default: 100).
    pub max_depth: Option<usize>,

    /// Whether to respect gitignore files.
    pub git_ignore: bool,

    /// Whether to skip hidden files.
    pub hidden: bool,

    /// Walker threads. 0 or 1 walks on a single background thread.
    pub threads: usize,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            git_ignore: true,
            hidden: true,
            threads: 1,
        }
    }
}

/// File discovered by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Path relative to the walk root.
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,
}

/// Statistics from a walk operation.
#[derive(Debug, Default)]
pub struct WalkStats {
    /// Files sent to the receiver.
    pub files_found: usize,

    /// Files skipped for exceeding [`MAX_FILE_SIZE`].
    pub files_skipped_size: usize,

    /// Entry errors (permission denied, symlink loops).
    pub errors: usize,
}

/// File walker with gitignore support.
pub struct FileWalker {
    config: WalkerConfig,
}

impl FileWalker {
    /// Create a new walker with the given configuration.
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    fn builder(&self, root: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(self.config.hidden)
            .git_ignore(self.config.git_ignore)
            .git_exclude(true)
            .git_global(false)
            .parents(false)
            .follow_links(true)
            .max_depth(self.config.max_depth);

        if self.config.threads > 1 {
            builder.threads(self.config.threads);
        }

        builder.filter_entry(|entry| !is_skipped_dir(entry));
        builder
    }

    /// Walk `root`, streaming discovered files through the returned receiver.
    pub fn walk(&self, root: &Path) -> (Receiver<WalkedFile>, WalkHandle) {
        let (tx, rx) = bounded(1000);
        let builder = self.builder(root);
        let root = root.to_path_buf();

        let handle = if self.config.threads > 1 {
            std::thread::spawn(move || walk_parallel(builder, &root, tx))
        } else {
            std::thread::spawn(move || walk_sequential(builder, &root, tx))
        };

        (rx, WalkHandle { handle })
    }

    /// Walk and collect all files.
    pub fn walk_collect(&self, root: &Path) -> (Vec<WalkedFile>, WalkStats) {
        let (rx, handle) = self.walk(root);
        let files: Vec<_> = rx.iter().collect();
        let stats = handle.join();
        (files, stats)
    }
}

fn is_skipped_dir(entry: &ignore::DirEntry) -> bool {
    entry.file_type().is_some_and(|t| t.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
}

/// Outcome of inspecting one walk entry.
enum Visit {
    File(WalkedFile),
    TooLarge,
    Error,
    Skip,
}

fn visit(entry: Result<ignore::DirEntry, ignore::Error>, root: &Path) -> Visit {
    let entry = match entry {
        Ok(entry) => entry,
        Err(err) => {
            tracing::warn!("walk error: {}", err);
            return Visit::Error;
        }
    };

    if !entry.file_type().is_some_and(|t| t.is_file()) {
        return Visit::Skip;
    }

    let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
    if size > MAX_FILE_SIZE {
        tracing::warn!("skipping {} ({} bytes > 10MB limit)", entry.path().display(), size);
        return Visit::TooLarge;
    }

    let path = entry
        .path()
        .strip_prefix(root)
        .unwrap_or(entry.path())
        .to_path_buf();
    Visit::File(WalkedFile { path, size })
}

fn walk_sequential(builder: WalkBuilder, root: &Path, tx: Sender<WalkedFile>) -> WalkStats {
    let mut stats = WalkStats::default();
    for entry in builder.build() {
        match visit(entry, root) {
            Visit::File(file) => {
                stats.files_found += 1;
                if tx.send(file).is_err() {
                    break;
                }
            }
            Visit::TooLarge => stats.files_skipped_size += 1,
            Visit::Error => stats.errors += 1,
            Visit::Skip => {}
        }
    }
    stats
}

fn walk_parallel(builder: WalkBuilder, root: &Path, tx: Sender<WalkedFile>) -> WalkStats {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let found = AtomicUsize::new(0);
    let too_large = AtomicUsize::new(0);
    let errors = AtomicUsize::new(0);

    builder.build_parallel().run(|| {
        let tx = tx.clone();
        let (found, too_large, errors) = (&found, &too_large, &errors);
        Box::new(move |entry| match visit(entry, root) {
            Visit::File(file) => {
                found.fetch_add(1, Ordering::Relaxed);
                if tx.send(file).is_err() {
                    return WalkState::Quit;
                }
                WalkState::Continue
            }
            Visit::TooLarge => {
                too_large.fetch_add(1, Ordering::Relaxed);
                WalkState::Continue
            }
            Visit::Error => {
                errors.fetch_add(1, Ordering::Relaxed);
                WalkState::Continue
            }
            Visit::Skip => WalkState::Continue,
        })
    });

    WalkStats {
        files_found: found.into_inner(),
        files_skipped_size: too_large.into_inner(),
        errors: errors.into_inner(),
    }
}

/// Handle to a running walk operation.
pub struct WalkHandle {
    handle: std::thread::JoinHandle<WalkStats>,
}

impl WalkHandle {
    /// Wait for the walk to complete and return stats.
    pub fn join(self) -> WalkStats {
        self.handle.join().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
