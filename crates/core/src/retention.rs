// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention sweep of the stable directory
//!
//! Deletes every file in the stable directory whose name matches the
//! configured pattern. File age is not considered.

use crate::error::SpoolError;
use crate::events::{EventBus, SpoolEvent};
use crate::shutdown::ShutdownSignal;
use regex::Regex;
use spool_adapters::FsAdapter;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};

/// What one retention sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub removed: Vec<String>,
    pub failed: usize,
}

/// Periodically deletes matching files from the stable directory
pub struct RetentionScheduler<F: FsAdapter> {
    fs: F,
    bus: EventBus,
    stable_dir: PathBuf,
    pattern: Regex,
    interval: Duration,
    shutdown: ShutdownSignal,
}

impl<F: FsAdapter> RetentionScheduler<F> {
    pub fn new(
        fs: F,
        bus: EventBus,
        stable_dir: PathBuf,
        pattern: Regex,
        interval: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            fs,
            bus,
            stable_dir,
            pattern,
            interval,
            shutdown,
        }
    }

    /// Sweep every interval until shutdown is signalled
    pub async fn run(self) {
        let mut stop = self.shutdown.watch();
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.is_shut_down() {
            tokio::select! {
                biased;
                _ = stop.changed() => break,
                _ = ticker.tick() => {
                    if self.is_shut_down() {
                        break;
                    }
                    self.run_cycle().await;
                }
            }
        }

        tracing::debug!("retention loop stopped");
    }

    /// Run a single sweep
    ///
    /// Failures are reported as one error event for the whole sweep.
    /// Returns None if shut down or the directory could not be listed.
    pub async fn run_cycle(&self) -> Option<RetentionReport> {
        if self.is_shut_down() {
            return None;
        }

        let names = match self.fs.list_dir(&self.stable_dir).await {
            Ok(names) => names,
            Err(e) => {
                let err = SpoolError::ListDirectory(e);
                tracing::error!(error = %err, "retention sweep aborted");
                self.emit(SpoolEvent::error(&err));
                return None;
            }
        };

        let mut tasks = JoinSet::new();
        for name in names.into_iter().filter(|n| self.pattern.is_match(n)) {
            let fs = self.fs.clone();
            let path = self.stable_dir.join(&name);
            tasks.spawn(async move {
                let outcome = fs.remove_file(&path).await;
                (name, outcome)
            });
        }

        let mut report = RetentionReport::default();
        let mut first_failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(()))) => report.removed.push(name),
                Ok((name, Err(source))) => {
                    report.failed += 1;
                    if first_failure.is_none() {
                        first_failure = Some(SpoolError::PerFileIo { file: name, source });
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(error = %e, "retention task did not complete");
                    if first_failure.is_none() {
                        first_failure = Some(SpoolError::FileTask(e));
                    }
                }
            }
        }

        if let Some(err) = first_failure {
            tracing::warn!(error = %err, failed = report.failed, "retention sweep incomplete");
            let message = if report.failed > 1 {
                format!("{} (and {} more)", err, report.failed - 1)
            } else {
                err.to_string()
            };
            self.emit(SpoolEvent::Error {
                kind: err.kind(),
                message,
            });
        }

        tracing::debug!(removed = report.removed.len(), "retention sweep complete");
        Some(report)
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    fn emit(&self, event: SpoolEvent) {
        self.shutdown.unless_triggered(|| self.bus.publish(event));
    }
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
