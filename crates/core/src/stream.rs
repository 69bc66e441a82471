// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active segment management
//!
//! The stream manager owns at most one open segment. Open, close, rotate
//! and write all run under a single mutex, so a segment is never closed
//! while a write to it is in flight and two segments are never open at once.

use crate::clock::Clock;
use crate::config::StreamOptions;
use crate::error::SpoolError;
use crate::events::{EventBus, SpoolEvent};
use crate::segment::SegmentNamer;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The open segment and its buffered writer
struct ActiveStream {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

#[derive(Default)]
struct StreamState {
    active: Option<ActiveStream>,
    shut_down: bool,
}

/// Owns the single active write handle of a spool
pub struct StreamManager<C: Clock> {
    dir: PathBuf,
    namer: SegmentNamer<C>,
    options: StreamOptions,
    bus: EventBus,
    state: Mutex<StreamState>,
}

impl<C: Clock> StreamManager<C> {
    pub fn new(dir: PathBuf, namer: SegmentNamer<C>, options: StreamOptions, bus: EventBus) -> Self {
        Self {
            dir,
            namer,
            options,
            bus,
            state: Mutex::new(StreamState::default()),
        }
    }

    /// Open a fresh segment, closing the current one first
    ///
    /// Returns the path of the new segment.
    pub fn open(&self) -> Result<PathBuf, SpoolError> {
        let (result, flush_err) = {
            let mut state = self.lock();
            let flush_err = Self::close_locked(&mut state);
            (self.open_locked(&mut state), flush_err)
        };
        self.report(flush_err);
        result
    }

    /// Append bytes to the active segment
    ///
    /// With no segment open the content is dropped and `NoActiveStream` is
    /// returned. A failed write closes the segment; subsequent writes fail
    /// with `NoActiveStream` until the next rotation opens a new one.
    pub fn write(&self, bytes: &[u8]) -> Result<(), SpoolError> {
        let mut state = self.lock();
        let Some(active) = state.active.as_mut() else {
            return Err(SpoolError::NoActiveStream);
        };

        match active.writer.write_all(bytes) {
            Ok(()) => {
                active.bytes_written += bytes.len() as u64;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(segment = %active.path.display(), error = %e, "write failed, closing segment");
                // The write error is the one worth reporting
                let _ = Self::close_locked(&mut state);
                Err(SpoolError::Stream(e))
            }
        }
    }

    /// Encode `text` with the configured encoding and append it
    pub fn write_str(&self, text: &str) -> Result<(), SpoolError> {
        let bytes = self.options.encoding.encode(text);
        self.write(&bytes)
    }

    /// Close the active segment, if any
    ///
    /// A `reason` is published as an error event once the segment is closed.
    pub fn close(&self, reason: Option<SpoolError>) {
        let flush_err = {
            let mut state = self.lock();
            Self::close_locked(&mut state)
        };
        self.report(flush_err);
        self.report(reason);
    }

    /// Close the active segment and open its successor atomically
    ///
    /// Returns `Ok(None)` once the manager has been shut down; no segment is
    /// opened in that case.
    pub fn rotate(&self) -> Result<Option<PathBuf>, SpoolError> {
        let (result, flush_err) = {
            let mut state = self.lock();
            if state.shut_down {
                return Ok(None);
            }
            let flush_err = Self::close_locked(&mut state);
            (self.open_locked(&mut state).map(Some), flush_err)
        };
        self.report(flush_err);
        result
    }

    /// Close the active segment and refuse further rotations
    pub fn shutdown(&self) {
        let flush_err = {
            let mut state = self.lock();
            state.shut_down = true;
            Self::close_locked(&mut state)
        };
        self.report(flush_err);
    }

    /// Path of the active segment
    pub fn active_path(&self) -> Option<PathBuf> {
        self.lock().active.as_ref().map(|a| a.path.clone())
    }

    pub fn is_open(&self) -> bool {
        self.lock().active.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn namer(&self) -> &SegmentNamer<C> {
        &self.namer
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn open_locked(&self, state: &mut StreamState) -> Result<PathBuf, SpoolError> {
        let path = self.dir.join(self.namer.new_name());

        let mut options = OpenOptions::new();
        options.create(true);
        if self.options.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.options.mode);
        }

        let file = options.open(&path).map_err(|source| SpoolError::StreamOpen {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(segment = %path.display(), "segment opened");
        state.active = Some(ActiveStream {
            path: path.clone(),
            writer: BufWriter::new(file),
            bytes_written: 0,
        });
        Ok(path)
    }

    /// Flush and drop the active segment; returns a flush failure, if any
    fn close_locked(state: &mut StreamState) -> Option<SpoolError> {
        let mut active = state.active.take()?;
        let result = active.writer.flush();
        tracing::debug!(
            segment = %active.path.display(),
            bytes = active.bytes_written,
            "segment closed"
        );
        result.err().map(SpoolError::Stream)
    }

    fn report(&self, err: Option<SpoolError>) {
        if let Some(err) = err {
            self.bus.publish(SpoolEvent::error(&err));
        }
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
