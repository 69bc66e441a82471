// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Segment naming
//!
//! Segments are named `<prefix><epochMillis>.log`. The embedded timestamp is
//! the only age information the schedulers use; file metadata times are
//! never consulted.

use crate::clock::Clock;
use crate::error::SpoolError;
use regex::{Regex, RegexBuilder};

/// Segment file extension, including the dot
pub const SEGMENT_EXTENSION: &str = ".log";

/// Generates segment names and parses them back
#[derive(Debug, Clone)]
pub struct SegmentNamer<C: Clock> {
    prefix: String,
    pattern: Regex,
    clock: C,
}

impl<C: Clock> SegmentNamer<C> {
    pub fn new(prefix: &str, clock: C) -> Result<Self, SpoolError> {
        let source = format!(r"^{}([0-9]+)\.log$", regex::escape(prefix));
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| SpoolError::InvalidPattern { pattern: source, source: e })?;

        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
            clock,
        })
    }

    /// Name for a segment created now
    ///
    /// Two segments created in the same millisecond share a name.
    pub fn new_name(&self) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            self.clock.epoch_millis(),
            SEGMENT_EXTENSION
        )
    }

    /// Creation timestamp embedded in a segment name
    ///
    /// Returns None for names that are not segments, including digit runs
    /// too large for a u64.
    pub fn parse_timestamp(&self, name: &str) -> Option<u64> {
        let captures = self.pattern.captures(name)?;
        captures.get(1)?.as_str().parse().ok()
    }

    /// Whether `name` is a segment created at or before `cutoff_millis`
    pub fn is_eligible(&self, name: &str, cutoff_millis: u64) -> bool {
        self.parse_timestamp(name)
            .is_some_and(|created| created <= cutoff_millis)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
#[path = "segment_tests.rs"]
mod tests;
