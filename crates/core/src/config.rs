// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spool configuration
//!
//! `SpoolConfig` is the raw, deserializable form (TOML file or builder).
//! `validate()` turns it into a `ValidatedConfig` with resolved durations
//! and compiled patterns; a spool only ever runs from a validated config.

use crate::error::SpoolError;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default working directory, relative to the process cwd
pub const DEFAULT_WORKING_DIR: &str = "./flume_temp";
/// Default segment file name prefix
pub const DEFAULT_PREFIX: &str = "flume-";
/// Default rotation interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 60 * 1000;
/// Default retention interval in milliseconds
pub const DEFAULT_RETENTION_INTERVAL_MS: u64 = 10 * 60 * 1000;
/// Default retention pattern: segments a downstream consumer has marked done
pub const DEFAULT_RETENTION_PATTERN: &str = r"\.COMPLETED$";
/// Default unix permissions for new segments
pub const DEFAULT_MODE: u32 = 0o644;

/// A configured duration
///
/// Either a number of milliseconds (`100`, `"250"`, `"1.5"`) or a humantime
/// string (`"10s"`, `"5m"`). Only resolves if the result is positive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Interval {
    Millis(f64),
    Text(String),
}

impl Interval {
    /// Resolve to a non-zero duration, naming `field` on failure
    pub fn resolve(&self, field: &'static str) -> Result<Duration, SpoolError> {
        let duration = match self {
            Interval::Millis(ms) => millis_to_duration(*ms),
            Interval::Text(text) => {
                let text = text.trim();
                match text.parse::<f64>() {
                    Ok(ms) => millis_to_duration(ms),
                    Err(_) => humantime::parse_duration(text).ok(),
                }
            }
        };

        duration
            .filter(|d| !d.is_zero())
            .ok_or_else(|| SpoolError::InvalidInterval {
                field,
                value: self.to_string(),
            })
    }
}

fn millis_to_duration(ms: f64) -> Option<Duration> {
    if !ms.is_finite() || ms <= 0.0 {
        return None;
    }
    let nanos = (ms * 1_000_000.0).round();
    if nanos >= u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos as u64))
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Millis(ms) => write!(f, "{}", ms),
            Interval::Text(text) => f.write_str(text),
        }
    }
}

impl From<Duration> for Interval {
    fn from(d: Duration) -> Self {
        Interval::Millis(d.as_secs_f64() * 1000.0)
    }
}

impl From<u64> for Interval {
    fn from(ms: u64) -> Self {
        Interval::Millis(ms as f64)
    }
}

impl From<&str> for Interval {
    fn from(s: &str) -> Self {
        Interval::Text(s.to_string())
    }
}

impl From<String> for Interval {
    fn from(s: String) -> Self {
        Interval::Text(s)
    }
}

/// Text encoding applied by `write_str`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    #[serde(alias = "utf-8")]
    Utf8,
    /// One byte per char; chars above U+00FF are written as `?`
    #[serde(alias = "binary")]
    Latin1,
}

impl Encoding {
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        match self {
            Encoding::Utf8 => Cow::Borrowed(text.as_bytes()),
            Encoding::Latin1 => Cow::Owned(
                text.chars()
                    .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                    .collect(),
            ),
        }
    }
}

/// How segment files are opened
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Unix permission bits for newly created segments
    pub mode: u32,
    /// Append to an existing file of the same name instead of truncating it
    pub append: bool,
    pub encoding: Encoding,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE,
            append: true,
            encoding: Encoding::Utf8,
        }
    }
}

/// Retention sweep of the stable directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetentionOptions {
    pub enabled: bool,
    pub interval: Interval,
    /// Regex over file names in the stable directory
    pub pattern: String,
}

impl Default for RetentionOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Interval::from(DEFAULT_RETENTION_INTERVAL_MS),
            pattern: DEFAULT_RETENTION_PATTERN.to_string(),
        }
    }
}

/// Raw spool configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpoolConfig {
    /// Directory holding the active and not-yet-transferred segments
    pub working_dir: PathBuf,
    /// Directory segments are relocated to once aged
    pub stable_dir: PathBuf,
    /// Rotation period and minimum segment age for transfer
    pub interval: Interval,
    pub prefix: String,
    pub stream: StreamOptions,
    pub retention: RetentionOptions,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            stable_dir: PathBuf::new(),
            interval: Interval::from(DEFAULT_INTERVAL_MS),
            prefix: DEFAULT_PREFIX.to_string(),
            stream: StreamOptions::default(),
            retention: RetentionOptions::default(),
        }
    }
}

impl SpoolConfig {
    pub fn new(stable_dir: impl Into<PathBuf>) -> Self {
        Self {
            stable_dir: stable_dir.into(),
            ..Self::default()
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn interval(mut self, interval: impl Into<Interval>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn stream(mut self, stream: StreamOptions) -> Self {
        self.stream = stream;
        self
    }

    /// Enable retention with the given sweep interval and name pattern
    pub fn retention(mut self, interval: impl Into<Interval>, pattern: impl Into<String>) -> Self {
        self.retention = RetentionOptions {
            enabled: true,
            interval: interval.into(),
            pattern: pattern.into(),
        };
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, SpoolError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self, SpoolError> {
        let text = std::fs::read_to_string(path).map_err(|source| SpoolError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every field and resolve intervals and patterns
    pub fn validate(&self) -> Result<ValidatedConfig, SpoolError> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(SpoolError::InvalidConfig("working_dir"));
        }
        if self.stable_dir.as_os_str().is_empty() {
            return Err(SpoolError::InvalidConfig("stable_dir"));
        }
        if self.prefix.contains(|c: char| c == '/' || c == '\\') {
            return Err(SpoolError::InvalidConfig("prefix without path separators"));
        }

        let rotation_interval = self.interval.resolve("interval")?;

        let retention = if self.retention.enabled {
            let interval = self.retention.interval.resolve("retention.interval")?;
            let pattern =
                Regex::new(&self.retention.pattern).map_err(|source| SpoolError::InvalidPattern {
                    pattern: self.retention.pattern.clone(),
                    source,
                })?;
            Some(RetentionPlan { interval, pattern })
        } else {
            None
        };

        Ok(ValidatedConfig {
            working_dir: self.working_dir.clone(),
            stable_dir: self.stable_dir.clone(),
            rotation_interval,
            prefix: self.prefix.clone(),
            stream: self.stream.clone(),
            retention,
        })
    }
}

/// Configuration a spool runs from
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub working_dir: PathBuf,
    pub stable_dir: PathBuf,
    pub rotation_interval: Duration,
    pub prefix: String,
    pub stream: StreamOptions,
    /// None when retention is disabled
    pub retention: Option<RetentionPlan>,
}

#[derive(Debug, Clone)]
pub struct RetentionPlan {
    pub interval: Duration,
    pub pattern: Regex,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
