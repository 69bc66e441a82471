// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic transfer of aged segments to the stable directory
//!
//! Each cycle rotates the active segment first, so nothing it inspects can
//! still be receiving writes. Eligible segments are then handled
//! concurrently: empty ones are removed, the rest renamed into the stable
//! directory under the same name. A failed file stays in the working
//! directory and is retried on the next cycle.

use crate::clock::Clock;
use crate::error::SpoolError;
use crate::events::{EventBus, SpoolEvent};
use crate::shutdown::ShutdownSignal;
use crate::stream::StreamManager;
use spool_adapters::{FsAdapter, FsError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};

/// What one transfer cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Segments renamed into the stable directory
    pub moved: Vec<String>,
    /// Empty segments deleted from the working directory
    pub removed: Vec<String>,
    /// Segments left in place after a failure
    pub failed: usize,
}

enum Relocation {
    Moved,
    Removed,
}

/// Rotates the active segment and relocates aged segments on a fixed period
pub struct TransferScheduler<F: FsAdapter, C: Clock> {
    stream: Arc<StreamManager<C>>,
    fs: F,
    bus: EventBus,
    stable_dir: PathBuf,
    interval: Duration,
    shutdown: ShutdownSignal,
}

impl<F: FsAdapter, C: Clock> TransferScheduler<F, C> {
    pub fn new(
        stream: Arc<StreamManager<C>>,
        fs: F,
        bus: EventBus,
        stable_dir: PathBuf,
        interval: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            stream,
            fs,
            bus,
            stable_dir,
            interval,
            shutdown,
        }
    }

    /// Run cycles every interval until shutdown is signalled
    ///
    /// The first cycle runs one full interval after the call.
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

        tracing::debug!("transfer loop stopped");
    }

    /// Run a single transfer cycle
    ///
    /// Returns None if the cycle was abandoned because of shutdown or
    /// aborted because the working directory could not be listed.
    pub async fn run_cycle(&self) -> Option<TransferReport> {
        if self.is_shut_down() {
            return None;
        }

        let cutoff = self
            .stream
            .namer()
            .clock()
            .epoch_millis()
            .saturating_sub(cutoff_age_millis(self.interval));

        match self.stream.rotate() {
            Ok(Some(segment)) => tracing::debug!(segment = %segment.display(), "rotated"),
            Ok(None) => return None,
            Err(e) => {
                // Already-closed segments can still be transferred
                tracing::error!(error = %e, "rotation failed to open a new segment");
                self.emit(SpoolEvent::error(&e));
            }
        }

        let working_dir = self.stream.dir();
        let names = match self.fs.list_dir(working_dir).await {
            Ok(names) => names,
            Err(e) => {
                let err = SpoolError::ListDirectory(e);
                tracing::error!(error = %err, "transfer cycle aborted");
                self.emit(SpoolEvent::error(&err));
                return None;
            }
        };

        let namer = self.stream.namer();
        let eligible: Vec<String> = names
            .into_iter()
            .filter(|name| namer.is_eligible(name, cutoff))
            .collect();
        tracing::debug!(cutoff, ?eligible, "eligible segments");

        let mut tasks = JoinSet::new();
        for name in eligible {
            let fs = self.fs.clone();
            let from = working_dir.join(&name);
            let to = self.stable_dir.join(&name);
            tasks.spawn(async move {
                let outcome = relocate(&fs, &from, &to).await;
                (name, outcome)
            });
        }

        let mut report = TransferReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(Relocation::Moved))) => report.moved.push(name),
                Ok((name, Ok(Relocation::Removed))) => report.removed.push(name),
                Ok((name, Err(source))) => {
                    report.failed += 1;
                    let err = SpoolError::PerFileIo { file: name, source };
                    tracing::warn!(error = %err, "segment left for next cycle");
                    self.emit(SpoolEvent::error(&err));
                }
                Err(e) => {
                    report.failed += 1;
                    let err = SpoolError::FileTask(e);
                    tracing::warn!(error = %err, "transfer task did not complete");
                    self.emit(SpoolEvent::error(&err));
                }
            }
        }

        tracing::debug!(
            moved = report.moved.len(),
            removed = report.removed.len(),
            failed = report.failed,
            "transfer cycle complete"
        );
        self.emit(SpoolEvent::Transfer);
        Some(report)
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Publish unless shutdown has begun
    fn emit(&self, event: SpoolEvent) {
        self.shutdown.unless_triggered(|| self.bus.publish(event));
    }
}

/// Minimum age in whole milliseconds, rounded up and at least one
///
/// Segment names have millisecond resolution, so a cutoff of `now` would
/// make a segment opened during this millisecond eligible.
fn cutoff_age_millis(interval: Duration) -> u64 {
    let millis = interval.as_nanos().div_ceil(1_000_000).max(1);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Remove an empty segment or rename it into the stable directory
async fn relocate<F: FsAdapter>(fs: &F, from: &Path, to: &Path) -> Result<Relocation, FsError> {
    if fs.file_len(from).await? == 0 {
        fs.remove_file(from).await?;
        Ok(Relocation::Removed)
    } else {
        fs.rename(from, to).await?;
        Ok(Relocation::Moved)
    }
}

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod tests;
