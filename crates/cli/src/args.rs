// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments and their merge with the config file

use anyhow::{Context, Result};
use clap::Parser;
use spool_core::SpoolConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "flume-spool",
    version,
    about = "Spool stdin into time-rotated segment files"
)]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the active and not-yet-transferred segments
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Directory aged segments are moved to
    #[arg(long, value_name = "DIR")]
    pub stable_dir: Option<PathBuf>,

    /// Rotation interval: milliseconds or a duration such as "30s"
    #[arg(long, value_name = "INTERVAL")]
    pub interval: Option<String>,

    /// Enable the retention sweep of the stable directory
    #[arg(long)]
    pub retention: bool,

    /// Retention sweep interval
    #[arg(long, value_name = "INTERVAL")]
    pub retention_interval: Option<String>,

    /// Regex selecting stable files to delete
    #[arg(long, value_name = "REGEX")]
    pub retention_pattern: Option<String>,

    /// Segment file name prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// How long to keep running after stdin closes
    #[arg(long, value_name = "DURATION", default_value = "0s", value_parser = humantime::parse_duration)]
    pub linger: Duration,
}

impl Cli {
    /// Build the spool config from the optional file plus flag overrides
    pub fn spool_config(&self) -> Result<SpoolConfig> {
        let mut config = match &self.config {
            Some(path) => SpoolConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SpoolConfig::default(),
        };

        if let Some(dir) = &self.working_dir {
            config.working_dir = dir.clone();
        }
        if let Some(dir) = &self.stable_dir {
            config.stable_dir = dir.clone();
        }
        if let Some(interval) = &self.interval {
            config.interval = interval.as_str().into();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if self.retention {
            config.retention.enabled = true;
        }
        if let Some(interval) = &self.retention_interval {
            config.retention.interval = interval.as_str().into();
        }
        if let Some(pattern) = &self.retention_pattern {
            config.retention.pattern = pattern.clone();
        }

        Ok(config)
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
