// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spool lifecycle: construction, writes and shutdown
//!
//! A spool is started from a validated configuration inside a tokio
//! runtime. Construction failures are returned; every failure after that
//! is published on the event bus.

use crate::clock::{Clock, SystemClock};
use crate::config::{SpoolConfig, ValidatedConfig};
use crate::error::SpoolError;
use crate::events::{EventBus, SpoolEvent};
use crate::retention::RetentionScheduler;
use crate::segment::SegmentNamer;
use crate::shutdown::ShutdownSignal;
use crate::stream::StreamManager;
use crate::transfer::TransferScheduler;
use spool_adapters::{FsAdapter, LocalFsAdapter, TracedFsAdapter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Spool with the production adapters
pub type Spool = SpoolController<SystemClock>;

/// External collaborators a spool runs against
#[derive(Clone, Debug)]
pub struct SpoolDeps<F, C> {
    pub fs: F,
    pub clock: C,
}

impl Default for SpoolDeps<TracedFsAdapter<LocalFsAdapter>, SystemClock> {
    fn default() -> Self {
        Self {
            fs: TracedFsAdapter::new(LocalFsAdapter),
            clock: SystemClock,
        }
    }
}

/// A running spool
pub struct SpoolController<C: Clock> {
    config: ValidatedConfig,
    stream: Arc<StreamManager<C>>,
    bus: EventBus,
    shutdown: ShutdownSignal,
    tasks: Vec<JoinHandle<()>>,
}

impl SpoolController<SystemClock> {
    /// Start a spool on the local filesystem
    pub fn start(config: &SpoolConfig, bus: EventBus) -> Result<Self, SpoolError> {
        Self::start_with(config, bus, SpoolDeps::default())
    }
}

impl<C: Clock> SpoolController<C> {
    /// Start a spool with explicit collaborators
    ///
    /// Creates both directories, opens the first segment, publishes
    /// `open` and spawns the schedulers on the current runtime.
    pub fn start_with<F: FsAdapter>(
        config: &SpoolConfig,
        bus: EventBus,
        deps: SpoolDeps<F, C>,
    ) -> Result<Self, SpoolError> {
        let config = config.validate()?;
        let handle = Handle::try_current().map_err(|_| SpoolError::NoRuntime)?;

        deps.fs
            .ensure_dir(&config.stable_dir)
            .map_err(SpoolError::DirectoryCreate)?;
        deps.fs
            .ensure_dir(&config.working_dir)
            .map_err(SpoolError::DirectoryCreate)?;

        let namer = SegmentNamer::new(&config.prefix, deps.clock)?;
        let stream = Arc::new(StreamManager::new(
            config.working_dir.clone(),
            namer,
            config.stream.clone(),
            bus.clone(),
        ));
        let segment = stream.open()?;

        tracing::info!(
            working_dir = %config.working_dir.display(),
            stable_dir = %config.stable_dir.display(),
            interval = ?config.rotation_interval,
            segment = %segment.display(),
            "spool started"
        );
        bus.publish(SpoolEvent::Open { segment });

        let shutdown = ShutdownSignal::new();
        let mut tasks = Vec::with_capacity(2);

        let transfer = TransferScheduler::new(
            Arc::clone(&stream),
            deps.fs.clone(),
            bus.clone(),
            config.stable_dir.clone(),
            config.rotation_interval,
            shutdown.clone(),
        );
        tasks.push(handle.spawn(transfer.run()));

        if let Some(plan) = &config.retention {
            tracing::info!(
                interval = ?plan.interval,
                pattern = %plan.pattern,
                "retention enabled"
            );
            let retention = RetentionScheduler::new(
                deps.fs,
                bus.clone(),
                config.stable_dir.clone(),
                plan.pattern.clone(),
                plan.interval,
                shutdown.clone(),
            );
            tasks.push(handle.spawn(retention.run()));
        }

        Ok(Self {
            config,
            stream,
            bus,
            shutdown,
            tasks,
        })
    }

    /// Append bytes to the active segment
    ///
    /// Failures are published as error events.
    pub fn write(&self, content: impl AsRef<[u8]>) {
        if let Err(e) = self.stream.write(content.as_ref()) {
            self.report(e);
        }
    }

    /// Append text using the configured encoding
    pub fn write_str(&self, text: &str) {
        if let Err(e) = self.stream.write_str(text) {
            self.report(e);
        }
    }

    /// Stop the schedulers, close the active segment and publish `close`
    ///
    /// No scheduler event is published after `close`. Safe to call more
    /// than once.
    pub fn close(&self) {
        self.shutdown.trigger_then(|| {
            self.stream.shutdown();
            tracing::info!("spool closed");
            self.bus.publish(SpoolEvent::Close);
        });
    }

    /// Close and wait for the scheduler tasks to finish
    pub async fn shutdown(mut self) {
        self.close();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "scheduler task failed");
            }
        }
    }

    /// Path of the segment currently receiving writes
    pub fn active_segment(&self) -> Option<PathBuf> {
        self.stream.active_path()
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    fn report(&self, err: SpoolError) {
        tracing::warn!(error = %err, "write failed");
        self.bus.publish(SpoolEvent::error(&err));
    }
}

impl<C: Clock> Drop for SpoolController<C> {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
