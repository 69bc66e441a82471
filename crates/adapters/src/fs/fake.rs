// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake filesystem adapter for testing
//!
//! Delegates to the local filesystem but records every call and can be told
//! to fail specific operations.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FsAdapter, FsError, FsOp, LocalFsAdapter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Recorded filesystem call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    EnsureDir { path: PathBuf },
    ListDir { path: PathBuf },
    FileLen { path: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
    RemoveFile { path: PathBuf },
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    message: String,
    /// None = fail until healed
    remaining: Option<u32>,
}

/// Fake filesystem adapter for testing
#[derive(Clone, Default)]
pub struct FakeFsAdapter {
    inner: LocalFsAdapter,
    calls: Arc<Mutex<Vec<FsCall>>>,
    failures: Arc<Mutex<HashMap<FsOp, InjectedFailure>>>,
}

impl FakeFsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<FsCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every future `op` fail with `message` until [`heal`](Self::heal)
    pub fn fail(&self, op: FsOp, message: impl Into<String>) {
        self.set_failure(op, message.into(), None);
    }

    /// Make the next `times` calls of `op` fail with `message`
    pub fn fail_times(&self, op: FsOp, times: u32, message: impl Into<String>) {
        self.set_failure(op, message.into(), Some(times));
    }

    /// Stop injecting failures for `op`
    pub fn heal(&self, op: FsOp) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&op);
    }

    fn set_failure(&self, op: FsOp, message: String, remaining: Option<u32>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(op, InjectedFailure { message, remaining });
    }

    fn record(&self, call: FsCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    /// Returns the injected error for `op`, consuming one use if limited
    fn injected(&self, op: FsOp, path: &Path) -> Option<FsError> {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let failure = failures.get_mut(&op)?;
        let message = failure.message.clone();

        match failure.remaining {
            Some(0) => {
                failures.remove(&op);
                return None;
            }
            Some(1) => {
                failures.remove(&op);
            }
            Some(n) => failure.remaining = Some(n - 1),
            None => {}
        }

        Some(FsError::io(op, path, std::io::Error::other(message)))
    }
}

#[async_trait]
impl FsAdapter for FakeFsAdapter {
    fn ensure_dir(&self, path: &Path) -> Result<(), FsError> {
        self.record(FsCall::EnsureDir {
            path: path.to_path_buf(),
        });
        if let Some(err) = self.injected(FsOp::EnsureDir, path) {
            return Err(err);
        }
        self.inner.ensure_dir(path)
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        self.record(FsCall::ListDir {
            path: path.to_path_buf(),
        });
        if let Some(err) = self.injected(FsOp::ListDir, path) {
            return Err(err);
        }
        self.inner.list_dir(path).await
    }

    async fn file_len(&self, path: &Path) -> Result<u64, FsError> {
        self.record(FsCall::FileLen {
            path: path.to_path_buf(),
        });
        if let Some(err) = self.injected(FsOp::Stat, path) {
            return Err(err);
        }
        self.inner.file_len(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.record(FsCall::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        if let Some(err) = self.injected(FsOp::Rename, from) {
            return Err(err);
        }
        self.inner.rename(from, to).await
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        self.record(FsCall::RemoveFile {
            path: path.to_path_buf(),
        });
        if let Some(err) = self.injected(FsOp::Remove, path) {
            return Err(err);
        }
        self.inner.remove_file(path).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
