// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Duration strings for run timeouts: `500ms`, `30s`, `1.5s`, `2m`, `1h`.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Unit suffix with its length in seconds as a fraction. Longest suffix
/// first so `ms` is not read as `m`.
const UNITS: &[(&str, f64, f64)] = &[
    ("ms", 1.0, 1000.0),
    ("s", 1.0, 1.0),
    ("m", 60.0, 1.0),
    ("h", 3600.0, 1.0),
];

/// Parse a duration string.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let Some((number, per, div)) = UNITS
        .iter()
        .find_map(|&(suffix, per, div)| s.strip_suffix(suffix).map(|n| (n.trim(), per, div)))
    else {
        return Err(format!(
            "invalid duration format: {s} (use 500ms, 30s, 2m or 1h)"
        ));
    };

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration: {s}"))?;
    if value.is_sign_negative() {
        return Err(format!("negative duration: {s}"));
    }
    Duration::try_from_secs_f64(value * per / div).map_err(|_| format!("invalid duration: {s}"))
}

/// Deserialize an optional duration string.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| parse_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
