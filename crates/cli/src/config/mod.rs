// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and validation.
//!
//! Handles tirun.toml parsing with version validation and unknown key warnings.

mod duration;
mod python;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use duration::parse_duration;
pub use python::PythonConfig;

use crate::error::{Error, Result};

/// Config file name searched for in the project tree.
pub const CONFIG_FILE: &str = "tirun.toml";

/// Supported config version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Known top-level keys.
const KNOWN_KEYS: &[&str] = &["version", "python"];

/// Minimum config structure for version checking.
#[derive(Deserialize)]
struct VersionOnly {
    version: Option<i64>,
}

/// Full configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Config file version (must be 1).
    pub version: i64,

    /// Python runner configuration.
    #[serde(default)]
    pub python: PythonConfig,
}

/// Configuration used when no config file exists.
impl Default for Config {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            python: PythonConfig::default(),
        }
    }
}

/// Load and parse a config file.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content, path)
}

/// Load the resolved config, or defaults when there is none.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            load(path)
        }
        None => {
            tracing::debug!("no {CONFIG_FILE} found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Parse config from string content.
///
/// Unknown top-level keys are logged and ignored; unknown keys inside a
/// known section are errors.
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    let config_error = |message: String| Error::Config {
        message,
        path: Some(path.to_path_buf()),
    };

    let version_check: VersionOnly =
        toml::from_str(content).map_err(|e| config_error(e.to_string()))?;

    let version = version_check
        .version
        .ok_or_else(|| config_error("missing required field: version".to_string()))?;

    if version != SUPPORTED_VERSION {
        return Err(config_error(format!(
            "unsupported config version {} (supported: {})\n  Upgrade tirun to use this config.",
            version, SUPPORTED_VERSION
        )));
    }

    let mut table: toml::Table = toml::from_str(content).map_err(|e| config_error(e.to_string()))?;
    let unknown: Vec<String> = table
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    for key in unknown {
        tracing::warn!("{}: unrecognized field `{}` (ignored)", path.display(), key);
        table.remove(&key);
    }

    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| config_error(e.to_string()))
}

/// Find tirun.toml starting from `start_dir` and walking up to the git root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if current.join(".git").exists() {
            return None;
        }
        current = current.parent()?;
    }
}

/// Resolve the config path from an explicit flag (or `TIRUN_CONFIG`), else
/// by searching upward from `start_dir`.
pub fn resolve_config(explicit: Option<&Path>, start_dir: &Path) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(Error::Config {
            message: format!("config file not found: {}", path.display()),
            path: Some(path.to_path_buf()),
        }),
        None => Ok(find_config(start_dir)),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
