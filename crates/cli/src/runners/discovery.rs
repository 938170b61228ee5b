// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Glob-scoped test discovery.
//!
//! Globs are expanded against the walked source tree, matched files are
//! parsed on a bounded thread pool, and results are de-duplicated and
//! sorted so equal inputs always produce identical output.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use rayon::prelude::*;

use super::{RunnableTest, TestGlob};
use crate::error::{Error, Result};
use crate::fs::FileSystem;

/// Compile test globs into a matcher.
///
/// Unlike config-level pattern lists, a malformed test glob is fatal:
/// silently dropping it would shrink the test universe.
pub fn compile_globs(globs: &[TestGlob], root: &Path) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        let pattern = normalize_pattern(glob.as_str(), root);
        let compiled = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::Glob {
                pattern: glob.to_string(),
                message: e.kind().to_string(),
            })?;
        builder.add(compiled);
    }
    builder.build().map_err(|e| Error::Glob {
        pattern: globs
            .iter()
            .map(TestGlob::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        message: e.to_string(),
    })
}

/// Make a pattern root-relative: strip a leading `./` or an absolute root prefix.
fn normalize_pattern(pattern: &str, root: &Path) -> String {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let as_path = Path::new(pattern);
    if as_path.is_absolute()
        && let Ok(rel) = as_path.strip_prefix(root)
    {
        return slash_path(rel);
    }
    pattern.to_string()
}

/// Files under `root` matched by any glob, sorted and de-duplicated.
pub fn matching_files(fs: &dyn FileSystem, root: &Path, globs: &[TestGlob]) -> Result<Vec<PathBuf>> {
    if globs.is_empty() {
        return Ok(Vec::new());
    }
    let set = compile_globs(globs, root)?;
    let files = fs.walk_files(root)?;

    let matched: BTreeSet<PathBuf> = files
        .into_iter()
        .filter(|rel| set.is_match(slash_path(rel)))
        .collect();
    Ok(matched.into_iter().collect())
}

/// Discover tests in every file matched by `globs`.
///
/// `parse` receives the root-relative path and file contents. Files that
/// cannot be read or parsed are logged and skipped.
pub fn discover<F, E>(
    fs: &dyn FileSystem,
    root: &Path,
    globs: &[TestGlob],
    threads: usize,
    parse: F,
) -> Result<Vec<RunnableTest>>
where
    F: Fn(&Path, &str) -> std::result::Result<Vec<RunnableTest>, E> + Sync,
    E: std::fmt::Display,
{
    let files = matching_files(fs, root, globs)?;
    tracing::debug!("discovery: {} files matched {} globs", files.len(), globs.len());
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| Error::Internal(format!("failed to build discovery pool: {e}")))?;

    let per_file: Vec<Vec<RunnableTest>> = pool.install(|| {
        files
            .par_iter()
            .map(|rel| {
                let path = root.join(rel);
                let content = match fs.read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!("skipping {}: {}", rel.display(), e);
                        return Vec::new();
                    }
                };
                match parse(rel, &content) {
                    Ok(tests) => tests,
                    Err(e) => {
                        tracing::warn!("skipping {}: {}", rel.display(), e);
                        Vec::new()
                    }
                }
            })
            .collect()
    });

    let tests: BTreeSet<RunnableTest> = per_file.into_iter().flatten().collect();
    Ok(tests.into_iter().collect())
}

/// Path with `/` separators, for glob matching and slashed package names.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
