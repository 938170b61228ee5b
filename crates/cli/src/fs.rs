// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only filesystem capability.
//!
//! Runners never touch `std::fs` directly; they go through [`FileSystem`]
//! so discovery can run against an in-memory tree in tests.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::walker::{FileWalker, MAX_FILE_SIZE, WalkerConfig};

/// Read-only view of a source tree.
pub trait FileSystem: Send + Sync {
    /// List every file under `root`, as paths relative to `root`.
    ///
    /// Fails when `root` itself cannot be read.
    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// Filesystem backed by the operating system.
#[derive(Debug, Clone, Default)]
pub struct OsFileSystem {
    walker: WalkerConfig,
}

impl OsFileSystem {
    pub fn new(walker: WalkerConfig) -> Self {
        Self { walker }
    }
}

impl FileSystem for OsFileSystem {
    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let meta = std::fs::metadata(root).map_err(|source| Error::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(Error::Io {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let (files, stats) = FileWalker::new(self.walker.clone()).walk_collect(root);
        tracing::debug!(
            "walked {}: {} files, {} too large, {} errors",
            root.display(),
            stats.files_found,
            stats.files_skipped_size,
            stats.errors
        );
        Ok(files.into_iter().map(|f| f.path).collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_FILE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file too large ({size} bytes, max: {MAX_FILE_SIZE} bytes)"),
            ));
        }
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory filesystem for tests and dry runs.
///
/// Paths are stored as given; lookups under a root strip that root prefix.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.insert(path.into(), content.as_bytes().to_vec());
        self
    }

    /// Add a file with raw bytes (e.g. invalid UTF-8).
    pub fn with_bytes(mut self, path: impl Into<PathBuf>, content: &[u8]) -> Self {
        self.files.insert(path.into(), content.to_vec());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let files: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|p| p.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .collect();
        if files.is_empty() && !root.as_os_str().is_empty() && !self.exists(root) {
            return Err(Error::Io {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            });
        }
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self
            .files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
        String::from_utf8(bytes.clone())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.keys().any(|p| p == path || p.starts_with(path))
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
